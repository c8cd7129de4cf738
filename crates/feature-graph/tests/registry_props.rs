//! Property-based tests for identifier registry invariants.

use std::collections::HashSet;

use feature_graph::{Identifier, IdentifierRegistry, RegistryError};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_prefix() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["csel", "cyl", "wp", "pi", "uni"]).prop_map(str::to_string)
}

/// Short prefixes, some ending in a digit.
fn arb_any_prefix() -> impl Strategy<Value = String> {
    "[a-c]{1,2}[0-9]?"
}

/// A set of distinct labels, drawn from the characters catalog labels use.
fn arb_labels() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[A-Z][A-Z ]{0,12}", 1..24).prop_map(|s| s.into_iter().collect())
}

proptest! {
    #[test]
    fn distinct_labels_get_distinct_identifiers(
        prefix in arb_prefix(),
        labels in arb_labels(),
    ) {
        let mut reg = IdentifierRegistry::new();
        let mut seen = HashSet::new();
        for label in &labels {
            let id = reg.next(&prefix, Some(label)).unwrap();
            prop_assert!(seen.insert(id));
        }
        prop_assert_eq!(reg.count(), labels.len());
    }

    #[test]
    fn lookup_is_idempotent(
        prefix in arb_prefix(),
        labels in arb_labels(),
        repeats in 1usize..5,
    ) {
        let mut reg = IdentifierRegistry::new();
        let issued: Vec<_> = labels
            .iter()
            .map(|l| reg.next(&prefix, Some(l)).unwrap())
            .collect();
        for _ in 0..repeats {
            for (label, id) in labels.iter().zip(&issued) {
                prop_assert_eq!(&reg.get(label).unwrap(), id);
                prop_assert_eq!(reg.label_of(id), Some(label.as_str()));
            }
        }
    }

    #[test]
    fn second_next_with_same_label_fails(
        prefix in arb_prefix(),
        other_prefix in arb_prefix(),
        label in "[A-Z]{1,10}",
    ) {
        let mut reg = IdentifierRegistry::new();
        let first = reg.next(&prefix, Some(&label)).unwrap();
        let err = reg.next(&other_prefix, Some(&label)).unwrap_err();
        prop_assert_eq!(
            err,
            RegistryError::DuplicateLabel { label: label.clone(), existing: first.clone() }
        );
        prop_assert_eq!(reg.get(&label).unwrap(), first);
    }

    #[test]
    fn unbound_label_fails_get_but_not_has(
        labels in arb_labels(),
        missing in "[a-z]{1,10}",
    ) {
        let mut reg = IdentifierRegistry::new();
        for label in &labels {
            reg.next("csel", Some(label)).unwrap();
        }
        // Missing labels are lowercase, bound labels uppercase.
        prop_assert!(!reg.has(&missing));
        prop_assert_eq!(
            reg.get(&missing).unwrap_err(),
            RegistryError::UnknownLabel { label: missing.clone() }
        );
    }

    #[test]
    fn anonymous_identifiers_never_collide_with_labelled_ones(
        pattern in prop::collection::vec(any::<bool>(), 1..40),
    ) {
        let mut reg = IdentifierRegistry::new();
        let mut seen = HashSet::new();
        for (i, labelled) in pattern.iter().enumerate() {
            let label = format!("L{i}");
            let id = if *labelled {
                reg.next("dif", Some(&label)).unwrap()
            } else {
                reg.next("dif", None).unwrap()
            };
            prop_assert!(seen.insert(id));
        }
        prop_assert_eq!(reg.count(), pattern.iter().filter(|b| **b).count());
    }

    #[test]
    fn issued_identifiers_are_unique_across_prefixes(
        prefixes in prop::collection::vec(arb_any_prefix(), 1..80),
    ) {
        let mut reg = IdentifierRegistry::new();
        let mut seen = HashSet::new();
        for prefix in &prefixes {
            match reg.next(prefix, None) {
                Ok(id) => {
                    prop_assert!(!prefix.ends_with(|c: char| c.is_ascii_digit()));
                    prop_assert!(seen.insert(id));
                }
                Err(err) => {
                    prop_assert!(prefix.ends_with(|c: char| c.is_ascii_digit()));
                    prop_assert_eq!(err, RegistryError::InvalidPrefix { prefix: prefix.clone() });
                }
            }
        }
    }

    #[test]
    fn bound_identifiers_are_never_issued(
        bound in prop::collection::btree_set(1u32..20, 1..10),
        issues in 1usize..30,
    ) {
        let mut reg = IdentifierRegistry::new();
        for n in &bound {
            reg.bind(&format!("promoted {n}"), Identifier::new(format!("csel{n}"))).unwrap();
        }
        for i in 0..issues {
            let label = format!("L{i}");
            let id = reg.next("csel", Some(&label)).unwrap();
            prop_assert_eq!(reg.label_of(&id), Some(label.as_str()));
        }
        for n in &bound {
            let label = format!("promoted {n}");
            let id = Identifier::new(format!("csel{n}"));
            prop_assert_eq!(reg.label_of(&id), Some(label.as_str()));
        }
        prop_assert_eq!(reg.count(), bound.len() + issues);
    }
}
