use crate::handler::{DefaultHandler, Handler};
use crate::pointer::Pointer;
use crate::predicate::{AllowAll, Predicate};
use serde::{Deserialize, Serialize};

/// Nesting depth after which a comparison is aborted.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Marks sequences whose pointer matches `pattern` as order-insensitive.
///
/// Elements are identified by the value of `key_field` (a serialized field
/// name of record elements, or a key of mapping elements), or by their own
/// scalar value when no field is given. Keys must be unique per sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnorePattern {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_field: Option<String>,
}

impl IgnorePattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            key_field: None,
        }
    }

    pub fn with_key_field(pattern: impl Into<String>, key_field: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            key_field: Some(key_field.into()),
        }
    }
}

/// Configuration applied before a comparison pass.
pub struct Options {
    pub(crate) predicate: Box<dyn Predicate>,
    pub(crate) handler: Box<dyn Handler>,
    pub(crate) prefix: Pointer,
    pub(crate) ignored: Vec<IgnorePattern>,
    pub(crate) max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            predicate: Box::new(AllowAll),
            handler: Box::new(DefaultHandler),
            prefix: Pointer::root(),
            ignored: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter operations before they are recorded.
    pub fn with_predicate(mut self, predicate: impl Predicate + 'static) -> Self {
        self.predicate = Box::new(predicate);
        self
    }

    /// Customize how recorded decisions become operations.
    pub fn with_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handler = Box::new(handler);
        self
    }

    /// Prepend `prefix` to every emitted path, for diffing a sub-tree of a
    /// larger document. A leading empty segment is treated as the root.
    pub fn with_prefix(mut self, prefix: impl Into<Pointer>) -> Self {
        let prefix = prefix.into();
        let rest = match prefix.segments().split_first() {
            Some((first, rest)) if first.is_empty() => rest,
            _ => prefix.segments(),
        };
        self.prefix = self.prefix.join(&Pointer::from_segments(rest.iter().cloned()));
        self
    }

    /// Compare every sequence by element value instead of position.
    pub fn ignore_slice_order(mut self) -> Self {
        self.ignored.push(IgnorePattern::new("*"));
        self
    }

    /// Compare sequences matching any of `patterns` by element identity.
    /// Patterns given here take precedence over earlier ones.
    pub fn ignore_slice_order_with_pattern(
        mut self,
        patterns: impl IntoIterator<Item = IgnorePattern>,
    ) -> Self {
        let mut ignored: Vec<IgnorePattern> = patterns.into_iter().collect();
        ignored.append(&mut self.ignored);
        self.ignored = ignored;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn prefix(&self) -> &Pointer {
        &self.prefix
    }

    pub fn ignored_slices(&self) -> &[IgnorePattern] {
        &self.ignored
    }
}
