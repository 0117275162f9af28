#![allow(dead_code)]

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use structpatch::{Diffable, Options, PatchList, create_json_patch, create_three_way_json_patch};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Diffable)]
pub struct A {
    #[serde(rename = "ptr", skip_serializing_if = "Option::is_none")]
    pub b: Option<B>,
    #[serde(rename = "struct")]
    pub c: C,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Diffable)]
pub struct B {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub str: String,
    pub bool: bool,
    pub int: i64,
    pub int8: i8,
    pub int16: i16,
    pub int32: i32,
    pub int64: i64,
    pub uint: u64,
    pub uint8: u8,
    pub uint16: u16,
    pub uint32: u32,
    pub uint64: u64,
    #[serde(rename = "ptr")]
    pub usize: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Diffable)]
pub struct C {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub str: String,
    #[serde(rename = "strmap")]
    pub str_map: HashMap<String, String>,
    #[serde(rename = "intmap")]
    pub int_map: HashMap<String, i64>,
    #[serde(rename = "boolmap")]
    pub bool_map: HashMap<String, bool>,
    #[serde(rename = "structmap")]
    pub struct_map: HashMap<String, B>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Diffable)]
#[serde(rename_all = "camelCase")]
pub struct D {
    #[serde(rename = "ptr")]
    pub opt_slice: Vec<Option<B>>,
    #[serde(rename = "structs")]
    pub struct_slice: Vec<C>,
    #[serde(rename = "strs")]
    pub string_slice: Vec<String>,
    #[serde(rename = "ints")]
    pub int_slice: Vec<i64>,
    pub structs_with_key: Vec<C>,
    #[serde(rename = "ptrWithKey")]
    pub opt_slice_with_key: Vec<Option<B>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Diffable)]
pub struct E {
    #[serde(skip)]
    pub internal: i32,
    pub exported: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Diffable)]
pub struct F {
    #[serde(rename = "a~bc//2a")]
    pub str: String,
    #[serde(rename = "a/b")]
    pub int: i64,
    #[serde(rename = "x~~e")]
    pub bool: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Diffable)]
pub struct G {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a: Option<A>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b: Option<B>,
    pub c: C,
    pub d: D,
    pub e: E,
    pub f: F,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Diffable)]
pub struct H {
    #[diffable(skip)]
    pub ignored: String,
    #[serde(rename = "notIgnored")]
    pub not_ignored: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Diffable)]
pub struct I {
    pub i: Value,
}

pub fn b(s: &str) -> B {
    B {
        str: s.to_string(),
        ..B::default()
    }
}

pub fn c(s: &str) -> C {
    C {
        str: s.to_string(),
        ..C::default()
    }
}

pub fn str_map(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Operations of a patch list as a JSON array, `[]` for an empty list.
pub fn ops(list: &PatchList) -> Value {
    serde_json::to_value(list.operations()).unwrap()
}

/// Apply `list` to the JSON of `current` and compare with the JSON of `expected`.
pub fn assert_applies<T: Serialize>(list: &PatchList, current: &T, expected: &T) {
    let mut doc = serde_json::to_value(current).unwrap();
    let expected = serde_json::to_value(expected).unwrap();

    if list.is_empty() {
        assert_eq!(list.len(), 0);
        assert_eq!(list.as_str(), "");
        assert_eq!(doc, expected);
        return;
    }

    assert_ne!(list.as_str(), "");
    let patch: json_patch::Patch = serde_json::from_slice(list.raw()).unwrap();
    json_patch::patch(&mut doc, &patch).unwrap();
    assert_eq!(doc, expected, "patch: {list}");
}

/// Diff `modified` against `current` and check that the patch reproduces `modified`.
pub fn test_patch<T: Diffable + Serialize>(modified: &T, current: &T) -> PatchList {
    test_patch_with_expected(modified, current, modified, Options::new())
}

pub fn test_patch_with_expected<T: Diffable + Serialize>(
    modified: &T,
    current: &T,
    expected: &T,
    options: Options,
) -> PatchList {
    let list = create_json_patch(modified, current, options).unwrap();
    assert_applies(&list, current, expected);
    list
}

pub fn test_three_way_patch_with_expected<T: Diffable + Serialize>(
    modified: &T,
    current: &T,
    original: &T,
    expected: &T,
) -> PatchList {
    let list = create_three_way_json_patch(modified, current, original, Options::new()).unwrap();
    assert_applies(&list, current, expected);
    list
}
