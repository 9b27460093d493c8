#![cfg(test)]

// Property tests for Tables kept inside the crate so they can reach the
// crate-private location API without feature gates.

use crate::protocol::{DynProtocol, Protocol};
use crate::tables::{Insert, Tables};
use crate::testing::Named;
use crate::value::Value;
use proptest::prelude::*;
use std::rc::Rc;

type V = Value<DynProtocol>;

// A logical key. `Alias` is an object equal to the text of the same name,
// so it shares that text's model slot.
#[derive(Clone, Debug, PartialEq, Eq)]
enum K {
    Int(i64),
    Text(String),
    Obj(String),
    Alias(String),
}

impl K {
    fn canonical(&self) -> K {
        match self {
            K::Alias(s) => K::Text(s.clone()),
            other => other.clone(),
        }
    }

    fn to_value(&self, colliding: bool) -> V {
        let p = DynProtocol;
        match self {
            K::Int(i) => Value::Int(*i),
            K::Text(s) => Value::str(s),
            K::Obj(s) => Value::Object(Rc::new(Named {
                name: format!("o:{s}"),
                hash: if colliding { 0 } else { p.hash_str(s) ^ 0x5a5a },
                alias: None,
            }) as crate::protocol::ObjectRef),
            K::Alias(s) => Value::Object(Rc::new(Named {
                name: format!("alias:{s}"),
                hash: p.hash_str(s),
                alias: Some(Value::str(s)),
            }) as crate::protocol::ObjectRef),
        }
    }
}

fn canonical_of(v: &V) -> K {
    match v {
        Value::Int(i) => K::Int(*i),
        Value::Str(s) => K::Text(s.to_string()),
        Value::Object(o) => {
            let name = o
                .as_any()
                .downcast_ref::<Named>()
                .map(|n| n.name.clone())
                .unwrap_or_default();
            match name.split_once(':') {
                Some(("o", rest)) => K::Obj(rest.to_string()),
                Some((_, rest)) => K::Text(rest.to_string()),
                None => K::Obj(name),
            }
        }
        _ => K::Obj(String::new()),
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i64),
    SetDefault(usize, i64),
    Remove(usize),
    Lookup(usize),
    PopNewest,
    Clear,
}

fn arb_key() -> impl Strategy<Value = K> {
    prop_oneof![
        (0i64..4).prop_map(K::Int),
        "[a-c]{1,2}".prop_map(K::Text),
        "[a-c]{1,2}".prop_map(K::Obj),
        "[a-c]{1,2}".prop_map(K::Alias),
    ]
}

fn arb_scenario() -> impl Strategy<Value = (Vec<K>, Vec<Op>)> {
    proptest::collection::vec(arb_key(), 1..=10).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            4 => (idx.clone(), any::<i64>()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => (idx.clone(), any::<i64>()).prop_map(|(i, v)| Op::SetDefault(i, v)),
            2 => idx.clone().prop_map(Op::Remove),
            2 => idx.clone().prop_map(Op::Lookup),
            1 => Just(Op::PopNewest),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run(pool: &[K], ops: Vec<Op>, colliding: bool) -> Result<(), TestCaseError> {
    let p = DynProtocol;
    let mut sut: Tables<DynProtocol> = Tables::new();
    let mut model: Vec<(K, i64)> = Vec::new();

    for op in ops {
        let version_before = sut.version();
        let len_before = model.len();
        match op {
            Op::Insert(i, v) => {
                let key = pool[i].to_value(colliding);
                let class = key.classify(&p).map_err(|e| TestCaseError::fail(e.to_string()))?;
                let prev = sut.insert(key, class, Value::Int(v), Insert::Probe, &p).unwrap();
                let c = pool[i].canonical();
                match model.iter_mut().find(|(k, _)| *k == c) {
                    Some(slot) => {
                        prop_assert_eq!(prev.and_then(|x| x.as_int()), Some(slot.1));
                        slot.1 = v;
                    }
                    None => {
                        prop_assert!(prev.is_none());
                        model.push((c, v));
                    }
                }
            }
            Op::SetDefault(i, v) => {
                let key = pool[i].to_value(colliding);
                let class = key.classify(&p).unwrap();
                let found = sut.lookup(&key, &class, &p).unwrap().and_then(|x| x.as_int());
                let c = pool[i].canonical();
                let expected = model.iter().find(|(k, _)| *k == c).map(|(_, v)| *v);
                prop_assert_eq!(found, expected);
                if found.is_none() {
                    sut.insert(key, class, Value::Int(v), Insert::KnownAbsent, &p).unwrap();
                    model.push((c, v));
                }
            }
            Op::Remove(i) => {
                let key = pool[i].to_value(colliding);
                let class = key.classify(&p).unwrap();
                let removed = sut.remove(&key, &class, &p).unwrap();
                let c = pool[i].canonical();
                match model.iter().position(|(k, _)| *k == c) {
                    Some(pos) => {
                        let (_, mv) = model.remove(pos);
                        let (sk, sv) = removed.expect("present in model");
                        prop_assert_eq!(canonical_of(&sk), c);
                        prop_assert_eq!(sv.as_int(), Some(mv));
                    }
                    None => prop_assert!(removed.is_none()),
                }
            }
            Op::Lookup(i) => {
                let key = pool[i].to_value(colliding);
                let class = key.classify(&p).unwrap();
                let found = sut.lookup(&key, &class, &p).unwrap().and_then(|x| x.as_int());
                let c = pool[i].canonical();
                let expected = model.iter().find(|(k, _)| *k == c).map(|(_, v)| *v);
                prop_assert_eq!(found, expected);
            }
            Op::PopNewest => {
                let loc = sut.newest();
                match model.pop() {
                    Some((mk, mv)) => {
                        let (sk, sv) = sut.remove_at(&loc.expect("non-empty"), &p).unwrap();
                        prop_assert_eq!(canonical_of(&sk), mk);
                        prop_assert_eq!(sv.as_int(), Some(mv));
                    }
                    None => prop_assert!(loc.is_none()),
                }
            }
            Op::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.version(), version_before + 1);
            }
        }

        // Version moves exactly when the key count does (clear aside).
        if len_before != model.len() {
            prop_assert_eq!(sut.version(), version_before + 1);
        } else if !model.is_empty() || len_before != 0 {
            prop_assert_eq!(sut.version(), version_before);
        }

        prop_assert_eq!(sut.len(), model.len());
        let order: Vec<K> = sut.entries().iter().map(|(k, _)| canonical_of(k)).collect();
        let expected: Vec<K> = model.iter().map(|(k, _)| k.clone()).collect();
        prop_assert_eq!(order, expected);
    }
    Ok(())
}

// Property: state-machine equivalence against an insertion-ordered model.
// - Lookups agree with the model for every key kind, including objects
//   equal to a stored text.
// - Replacing a value keeps its position; new keys append.
// - Removal returns the stored key and never reorders survivors.
// - `version` changes exactly on key-count changes.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run(&pool, ops, false)?;
    }

    // Collision variant: every plain object hashes to 0, sharing one chain
    // and colliding with the integer key 0.
    #[test]
    fn prop_state_machine_colliding((pool, ops) in arb_scenario()) {
        run(&pool, ops, true)?;
    }
}
