mod common;

use common::*;
use serde_json::json;
use structpatch::{OpKind, Operation, Options, PredicateFns, create_three_way_json_patch};

fn ints(v: &[i64]) -> D {
    D {
        int_slice: v.to_vec(),
        ..D::default()
    }
}

fn ints_and_strs(v: &[i64], s: &[&str]) -> D {
    D {
        int_slice: v.to_vec(),
        string_slice: s.iter().map(|s| s.to_string()).collect(),
        ..D::default()
    }
}

#[test]
fn replace_and_add() {
    let list = test_three_way_patch_with_expected(
        &ints(&[1, 2, 3, 4]),
        &ints(&[1, 2, 3]),
        &ints(&[1, 2, 3]),
        &ints(&[1, 2, 3, 4]),
    );
    assert_eq!(list.operations(), &[Operation::add("/ints/3", json!(4))]);

    let list = test_three_way_patch_with_expected(&b("new"), &b("old"), &b("old"), &b("new"));
    assert_eq!(list.operations(), &[Operation::replace("/str", json!("new"))]);
}

#[test]
fn remove_only_if_present_in_original() {
    // current gained an element the original never had: keep it
    let list = test_three_way_patch_with_expected(
        &ints(&[1, 2, 3]),
        &ints_and_strs(&[1, 2, 3], &["str1"]),
        &ints(&[1, 2, 3]),
        &ints_and_strs(&[1, 2, 3], &["str1"]),
    );
    assert!(list.is_empty());

    // the original had it, so the removal is honored
    let list = test_three_way_patch_with_expected(
        &ints_and_strs(&[1, 2, 3], &[]),
        &ints_and_strs(&[1, 2, 3], &["str1"]),
        &ints_and_strs(&[1, 2, 3], &["str1"]),
        &ints_and_strs(&[1, 2, 3], &[]),
    );
    assert_eq!(list.operations(), &[Operation::remove("/strs/0")]);
}

#[test]
fn removals_follow_additions() {
    let modified = G {
        b: Some(b("added")),
        ..G::default()
    };
    let current = G {
        c: C {
            str_map: str_map(&[("gone", "x")]),
            ..C::default()
        },
        ..G::default()
    };
    let list =
        create_three_way_json_patch(&modified, &current, &current, Options::new()).unwrap();
    let kinds: Vec<OpKind> = list.iter().map(|op| op.op).collect();
    assert_eq!(kinds, vec![OpKind::Add, OpKind::Remove]);
    assert_applies(&list, &current, &modified);
}

#[test]
fn same_original_behaves_like_two_way() {
    let modified = ints_and_strs(&[4, 5], &["a"]);
    let current = ints_and_strs(&[1, 2, 3], &["a", "b"]);
    let list =
        create_three_way_json_patch(&modified, &current, &current, Options::new()).unwrap();
    assert_applies(&list, &current, &modified);
}

#[test]
fn predicate_applies_to_both_passes() {
    let opts = Options::new().with_predicate(PredicateFns::new().on_remove(|_, _| false));
    let list = create_three_way_json_patch(
        &ints(&[1]),
        &ints(&[1, 2]),
        &ints(&[1, 2]),
        opts,
    )
    .unwrap();
    assert!(list.is_empty());
    assert_eq!(list.as_str(), "");
}
