//! Property tests for the registry store
//!
//! Random operation sequences are replayed against a `RegistryStore` and a
//! plain reference model; after every step the store must agree with the
//! model and keep its invariants.

use std::collections::HashSet;

use abkverz::{
    CanonicalKey, Registry, RegistryError, RegistryStore, compute_metrics, normalize,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(String, String),
    RemoveMeaning(String, String),
    RemoveAbbreviation(String),
}

fn abbreviation() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("ksc".to_string()),
        Just(" KSC ".to_string()),
        Just("ooo".to_string()),
        Just("Api".to_string()),
    ]
}

fn meaning() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Foo".to_string()),
        Just("foo".to_string()),
        Just("Bar".to_string()),
        Just(" Bar".to_string()),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (abbreviation(), meaning()).prop_map(|(a, m)| Op::Add(a, m)),
        2 => (abbreviation(), meaning()).prop_map(|(a, m)| Op::RemoveMeaning(a, m)),
        1 => abbreviation().prop_map(Op::RemoveAbbreviation),
    ]
}

fn assert_invariants(registry: &Registry) {
    for (key, meanings) in registry {
        assert!(CanonicalKey::is_canonical(key.as_str()));
        assert!(!meanings.is_empty(), "{key} has no meanings");
        let unique: HashSet<_> = meanings.iter().collect();
        assert_eq!(unique.len(), meanings.len(), "{key} has duplicates");
    }
}

proptest! {
    #[test]
    fn store_matches_reference_model(ops in prop::collection::vec(op(), 0..40)) {
        let store = RegistryStore::in_memory(Registry::new());
        let mut model = Registry::new();

        for op in ops {
            match op {
                Op::Add(abk, meaning) => {
                    let key = normalize(&abk);
                    let before = model.get(&key).cloned().unwrap_or_default();
                    match store.add_meaning(&key, &meaning) {
                        Ok(list) => {
                            prop_assert!(!before.contains(&meaning));
                            prop_assert_eq!(list.last(), Some(&meaning));
                            prop_assert_eq!(list.len(), before.len() + 1);
                            model.entry(key).or_default().push(meaning);
                        }
                        Err(RegistryError::AlreadyExists { current, .. }) => {
                            prop_assert!(before.contains(&meaning));
                            prop_assert_eq!(current, before);
                        }
                        Err(other) => prop_assert!(false, "unexpected {other:?}"),
                    }
                }
                Op::RemoveMeaning(abk, meaning) => {
                    let key = normalize(&abk);
                    match store.remove_meaning(&key, &meaning) {
                        Ok(()) => {
                            let list = model.get_mut(&key).unwrap();
                            prop_assert!(list.len() > 1);
                            list.retain(|m| m != &meaning);
                        }
                        Err(RegistryError::NotFound { .. }) => {
                            prop_assert!(!model.contains_key(&key));
                        }
                        Err(RegistryError::LastMeaning { .. }) => {
                            prop_assert_eq!(model[&key].len(), 1);
                        }
                        Err(RegistryError::MeaningNotFound { .. }) => {
                            prop_assert!(!model[&key].contains(&meaning));
                        }
                        Err(other) => prop_assert!(false, "unexpected {other:?}"),
                    }
                }
                Op::RemoveAbbreviation(abk) => {
                    let key = normalize(&abk);
                    match store.remove_abbreviation(&key) {
                        Ok(count) => {
                            prop_assert_eq!(model.shift_remove(&key).map(|m| m.len()), Some(count));
                            prop_assert!(store.lookup(&key).is_none());
                        }
                        Err(RegistryError::NotFound { .. }) => {
                            prop_assert!(!model.contains_key(&key));
                        }
                        Err(other) => prop_assert!(false, "unexpected {other:?}"),
                    }
                }
            }

            let snapshot = store.snapshot();
            assert_invariants(&snapshot);
            prop_assert_eq!(&*snapshot, &model);
            prop_assert_eq!(store.metrics(), compute_metrics(&model));
        }
    }
}

#[test]
fn duplicate_add_never_changes_length() {
    let store = RegistryStore::in_memory(Registry::new());
    let key = normalize("dup");
    store.add_meaning(&key, "x").unwrap();
    for _ in 0..5 {
        assert!(matches!(
            store.add_meaning(&key, "x"),
            Err(RegistryError::AlreadyExists { .. })
        ));
    }
    assert_eq!(store.lookup(&key).unwrap(), ["x"]);
}
