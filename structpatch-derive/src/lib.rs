use proc_macro::TokenStream;
use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    Attribute, DeriveInput, Expr, ExprLit, Field, Ident, Lit, LitStr, Meta, Token, ext::IdentExt,
    parse_macro_input, parse_quote, punctuated::Punctuated, spanned::Spanned,
};

#[proc_macro_derive(Diffable, attributes(diffable))]
pub fn derive_diffable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_diffable(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_diffable(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let crate_path = structpatch_crate_path();

    let struct_ident = &input.ident;
    let syn::Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "Diffable can only be derived for structs",
        ));
    };

    let fields = match &data_struct.fields {
        syn::Fields::Named(named) => &named.named,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Diffable requires named fields",
            ));
        }
    };

    let container = parse_container_attrs(&input.attrs)?;
    let field_specs = fields
        .iter()
        .map(|field| parse_field(field, &container))
        .collect::<syn::Result<Vec<_>>>()?;

    let field_entries = build_field_entries(&field_specs, &crate_path);

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let mut where_clause = where_clause.cloned().unwrap_or_else(|| parse_quote!(where));
    for param in input.generics.type_params() {
        let ident = &param.ident;
        where_clause
            .predicates
            .push(parse_quote!(#ident: #crate_path::Diffable));
    }
    where_clause
        .predicates
        .push(parse_quote!(#struct_ident #ty_generics: #crate_path::__private::serde::Serialize));

    let expanded = quote! {
        impl #impl_generics #crate_path::Diffable for #struct_ident #ty_generics #where_clause {
            fn node(&self) -> #crate_path::Node<'_> {
                #crate_path::Node::Record(::std::vec![
                    #(#field_entries),*
                ])
            }

            fn to_json(&self) -> #crate_path::__private::serde_json::Result<#crate_path::__private::serde_json::Value> {
                #crate_path::__private::serde_json::to_value(self)
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    };

    Ok(expanded)
}

fn structpatch_crate_path() -> TokenStream2 {
    match crate_name("structpatch") {
        Ok(FoundCrate::Itself) => quote!(crate),
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Err(_) => quote!(::structpatch),
    }
}

#[derive(Default)]
struct ContainerAttrs {
    rename_all: Option<RenameRule>,
}

#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    skip: bool,
}

struct FieldSpec {
    ident: Ident,
    attrs: FieldAttrs,
    name: String,
}

#[derive(Clone, Copy)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn from_lit(lit: &LitStr) -> syn::Result<Self> {
        Ok(match lit.value().as_str() {
            "lowercase" => RenameRule::Lower,
            "UPPERCASE" => RenameRule::Upper,
            "PascalCase" => RenameRule::Pascal,
            "camelCase" => RenameRule::Camel,
            "snake_case" => RenameRule::Snake,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnake,
            "kebab-case" => RenameRule::Kebab,
            "SCREAMING-KEBAB-CASE" => RenameRule::ScreamingKebab,
            other => {
                return Err(syn::Error::new(
                    lit.span(),
                    format!("unknown rename rule `{other}`"),
                ))
            }
        })
    }

    /// Field identifiers are snake_case to begin with.
    fn apply(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Pascal => pascal_case(field),
            RenameRule::Camel => {
                let pascal = pascal_case(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            }
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::ScreamingKebab => field.replace('_', "-").to_ascii_uppercase(),
        }
    }
}

fn pascal_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut capitalize = true;
    for ch in field.chars() {
        if ch == '_' {
            capitalize = true;
        } else if capitalize {
            out.push(ch.to_ascii_uppercase());
            capitalize = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut container = ContainerAttrs::default();
    for attr in attrs {
        if attr.path().is_ident("diffable") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    let lit: LitStr = meta.value()?.parse()?;
                    container.rename_all = Some(RenameRule::from_lit(&lit)?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported `diffable` attribute"))
                }
            })?;
        } else if attr.path().is_ident("serde") {
            for meta in serde_metas(attr)? {
                if meta.path().is_ident("rename_all") {
                    if let Some(lit) = serialize_name(&meta) {
                        container.rename_all = Some(RenameRule::from_lit(&lit)?);
                    }
                }
            }
        }
    }
    Ok(container)
}

fn parse_field(field: &Field, container: &ContainerAttrs) -> syn::Result<FieldSpec> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new(field.span(), "expected named field"))?;
    let mut attrs = FieldAttrs::default();

    for attr in &field.attrs {
        if attr.path().is_ident("serde") {
            for meta in serde_metas(attr)? {
                let path = meta.path();
                if path.is_ident("skip") || path.is_ident("skip_serializing") {
                    attrs.skip = true;
                } else if path.is_ident("rename") {
                    if let Some(lit) = serialize_name(&meta) {
                        attrs.rename = Some(lit.value());
                    }
                } else if path.is_ident("flatten") {
                    return Err(syn::Error::new_spanned(
                        path,
                        "flattened fields are not supported by Diffable",
                    ));
                }
            }
            continue;
        }
        if !attr.path().is_ident("diffable") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                attrs.skip = true;
                return Ok(());
            }
            if meta.path.is_ident("rename") {
                let value = meta.value()?;
                let lit: LitStr = value.parse()?;
                attrs.rename = Some(lit.value());
                return Ok(());
            }
            Err(meta.error("unsupported `diffable` field attribute"))
        })?;
    }

    let name = match &attrs.rename {
        Some(rename) => rename.clone(),
        None => {
            let raw = ident.unraw().to_string();
            match container.rename_all {
                Some(rule) => rule.apply(&raw),
                None => raw,
            }
        }
    };

    Ok(FieldSpec { ident, attrs, name })
}

/// Serde accepts many attribute forms; only the ones that change the
/// serialized field set or names matter here, the rest is skipped.
fn serde_metas(attr: &Attribute) -> syn::Result<Punctuated<Meta, Token![,]>> {
    attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
}

/// `rename = "x"` or `rename(serialize = "x")`.
fn serialize_name(meta: &Meta) -> Option<LitStr> {
    match meta {
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(lit), ..
            }) => Some(lit.clone()),
            _ => None,
        },
        Meta::List(list) => {
            let nested = list
                .parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
                .ok()?;
            nested
                .iter()
                .find(|m| m.path().is_ident("serialize"))
                .and_then(serialize_name)
        }
        Meta::Path(_) => None,
    }
}

fn build_field_entries(fields: &[FieldSpec], crate_path: &TokenStream2) -> Vec<TokenStream2> {
    let mut entries = Vec::new();
    for field in fields {
        if field.attrs.skip {
            continue;
        }
        let name_lit = LitStr::new(&field.name, Span::call_site());
        let ident = &field.ident;
        entries.push(quote! {
            #crate_path::Field {
                name: #name_lit,
                value: &self.#ident,
            }
        });
    }
    entries
}
