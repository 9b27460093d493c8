mod common;

use common::*;
use tiered_dict::{DictError, DynProtocol, ErrorKind, SetView, Value, ValueSet};

// Test: mutation during iteration.
// Assumes: the view captured length 3.
// Verifies: the next step after an insertion fails with the changed-size
// RuntimeError, once.
#[test]
fn insertion_during_iteration_is_detected() {
    let mut d = dict(&[("a", 1), ("b", 2), ("c", 3)]);
    let keys = d.keys();
    let mut it = keys.iter();
    assert_eq!(it.next().unwrap().unwrap().as_str(), Some("a"));
    d.set_item(s("z"), i(26)).unwrap();
    let err = it.next().unwrap().unwrap_err();
    assert_eq!(
        err,
        DictError::Runtime("dictionary changed size during iteration".into())
    );
    assert!(it.next().is_none());
}

#[test]
fn value_replacement_does_not_invalidate_iteration() {
    let mut d = dict(&[("a", 1), ("b", 2)]);
    let mut it = d.items().iter();
    d.set_item(s("a"), i(100)).unwrap();
    let (k, v) = it.next().unwrap().unwrap();
    assert_eq!(k.as_str(), Some("a"));
    assert_eq!(v.as_int(), Some(1), "the snapshot keeps the old value");
    assert!(it.next().unwrap().is_ok());
    assert!(it.next().is_none());
}

#[test]
fn delete_then_insert_keeps_length_and_passes() {
    let mut d = dict(&[("a", 1), ("b", 2)]);
    let values = d.values();
    d.del_item(&s("a")).unwrap();
    d.set_item(s("c"), i(3)).unwrap();
    let seen: Vec<i64> = values
        .iter()
        .map(|r| r.unwrap().as_int().unwrap())
        .collect();
    assert_eq!(seen, vec![1, 2]);
}

#[test]
fn views_restart_and_report_length() {
    let d = dict(&[("a", 1), ("b", 2)]);
    let keys = d.keys();
    assert_eq!(keys.len(), 2);
    assert!(!keys.is_empty());
    assert_eq!(keys.iter().count(), 2);
    assert_eq!(keys.iter().count(), 2);
    let via_dict: Vec<String> = d
        .iter()
        .map(|r| r.unwrap().as_str().unwrap().to_string())
        .collect();
    assert_eq!(via_dict, vec!["a", "b"]);
}

#[test]
fn view_reprs() {
    let d = dict(&[("a", 1), ("b", 2)]);
    assert_eq!(d.keys().repr().unwrap(), "dict_keys(['a', 'b'])");
    assert_eq!(d.values().repr().unwrap(), "dict_values([1, 2])");
    assert_eq!(
        d.items().repr().unwrap(),
        "dict_items([('a', 1), ('b', 2)])"
    );
    assert_eq!(format!("{:?}", dict(&[]).keys()), "dict_keys([])");
}

// Test: set algebra on keys views.
// Verifies: results follow left-operand order, comparisons hold.
#[test]
fn keys_set_algebra() {
    let a = dict(&[("a", 1), ("b", 2), ("c", 3)]);
    let b = dict(&[("c", 0), ("d", 0)]);
    let (ka, kb) = (a.keys(), b.keys());
    assert_eq!(ka.union(&kb).unwrap().repr().unwrap(), "{'a', 'b', 'c', 'd'}");
    assert_eq!(ka.intersection(&kb).unwrap().repr().unwrap(), "{'c'}");
    assert_eq!(ka.difference(&kb).unwrap().repr().unwrap(), "{'a', 'b'}");
    assert_eq!(
        ka.symmetric_difference(&kb).unwrap().repr().unwrap(),
        "{'a', 'b', 'd'}"
    );
    assert!(!ka.is_disjoint(&kb).unwrap());
    assert!(!ka.is_subset(&kb).unwrap());

    let only_c = ValueSet::from_values(DynProtocol, vec![s("c")]).unwrap();
    assert!(kb.is_superset(&only_c).unwrap());
    assert!(SetView::is_subset(&only_c, &kb).unwrap());
    assert!(ka.set_eq(&dict(&[("c", 9), ("b", 9), ("a", 9)]).keys()).unwrap());
}

#[test]
fn items_set_algebra_uses_pairs() {
    let a = dict(&[("a", 1), ("b", 2)]);
    let b = dict(&[("a", 1), ("b", 3)]);
    let common = a.items().intersection(&b.items()).unwrap();
    assert_eq!(common.repr().unwrap(), "{('a', 1)}");
    assert!(common
        .contains(&Value::pair(s("a"), i(1)))
        .unwrap());
}

#[test]
fn items_with_unhashable_values_cannot_form_sets() {
    let mut d = dict(&[]);
    d.set_item(s("n"), dict(&[]).into()).unwrap();
    let err = d.items().to_set().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    // Values views never need hashing.
    assert_eq!(d.values().len(), 1);
}
