use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::RegistryError;

/// Engine-facing identifier: a short prefix followed by a counter (`csel3`),
/// or a derived name formed from other identifiers (`pi2_csel3`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Wrap an identifier formed outside a registry (engine-fixed names).
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// `<self>_<local>`: the name a nested or imported entity takes when
    /// seen from the enclosing scope.
    pub fn scoped(&self, local: &Identifier) -> Identifier {
        Identifier(format!("{}_{}", self.0, local.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Scoped generator of unique identifiers with a bidirectional
/// label ↔ identifier map.
///
/// One registry exists for the shared document and one per primitive
/// template. Counters are monotonic per prefix and never reused, and no
/// identifier is handed out twice, whether issued or bound.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentifierRegistry {
    counters: HashMap<String, u32>,
    label_to_id: HashMap<String, Identifier>,
    id_to_label: HashMap<Identifier, String>,
    /// Every identifier issued by `next` or accepted by `bind`.
    taken: HashSet<Identifier>,
    /// Labels in binding order.
    order: Vec<String>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next identifier for `prefix`, binding `label` to it when
    /// given. Anonymous identifiers are unique but never enter the label map.
    ///
    /// A prefix must be non-empty and must not end in a digit, so that
    /// `prefix + counter` never reads as another prefix's identifier.
    pub fn next(&mut self, prefix: &str, label: Option<&str>) -> Result<Identifier, RegistryError> {
        if prefix.chars().last().map_or(true, |c| c.is_ascii_digit()) {
            return Err(RegistryError::InvalidPrefix {
                prefix: prefix.to_string(),
            });
        }
        if let Some(label) = label {
            if let Some(existing) = self.label_to_id.get(label) {
                return Err(RegistryError::DuplicateLabel {
                    label: label.to_string(),
                    existing: existing.clone(),
                });
            }
        }

        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        let id = loop {
            *counter += 1;
            let id = Identifier(format!("{prefix}{counter}"));
            // Skip names already bound from elsewhere.
            if !self.taken.contains(&id) {
                break id;
            }
        };
        self.taken.insert(id.clone());

        if let Some(label) = label {
            self.insert(label, id.clone());
        }
        Ok(id)
    }

    /// Bind `label` to an identifier formed elsewhere (an imported or
    /// promoted selection). The counters are not touched, but `next` will
    /// never issue `id` afterwards.
    pub fn bind(&mut self, label: &str, id: Identifier) -> Result<(), RegistryError> {
        if let Some(existing) = self.label_to_id.get(label) {
            return Err(RegistryError::DuplicateLabel {
                label: label.to_string(),
                existing: existing.clone(),
            });
        }
        if self.taken.contains(&id) {
            return Err(RegistryError::DuplicateIdentifier {
                identifier: id,
                label: label.to_string(),
            });
        }
        self.taken.insert(id.clone());
        self.insert(label, id);
        Ok(())
    }

    fn insert(&mut self, label: &str, id: Identifier) {
        self.label_to_id.insert(label.to_string(), id.clone());
        self.id_to_label.insert(id, label.to_string());
        self.order.push(label.to_string());
    }

    /// Resolve a label. An unbound label is a wiring defect, never defaulted.
    pub fn get(&self, label: &str) -> Result<Identifier, RegistryError> {
        self.label_to_id
            .get(label)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownLabel {
                label: label.to_string(),
            })
    }

    pub fn has(&self, label: &str) -> bool {
        self.label_to_id.contains_key(label)
    }

    /// Number of bound labels.
    pub fn count(&self) -> usize {
        self.label_to_id.len()
    }

    /// Reverse lookup.
    pub fn label_of(&self, id: &Identifier) -> Option<&str> {
        self.id_to_label.get(id).map(String::as_str)
    }

    /// Most recently issued identifier for `prefix`, if any.
    pub fn current(&self, prefix: &str) -> Option<Identifier> {
        self.counters
            .get(prefix)
            .map(|n| Identifier(format!("{prefix}{n}")))
    }

    /// Bound labels in binding order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Every identifier bound to a label.
    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.id_to_label.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_per_prefix() {
        let mut reg = IdentifierRegistry::new();
        assert_eq!(reg.next("cyl", Some("a")).unwrap().as_str(), "cyl1");
        assert_eq!(reg.next("wp", Some("b")).unwrap().as_str(), "wp1");
        assert_eq!(reg.next("cyl", Some("c")).unwrap().as_str(), "cyl2");
    }

    #[test]
    fn anonymous_identifiers_advance_counter_without_binding() {
        let mut reg = IdentifierRegistry::new();
        let anon = reg.next("endif", None).unwrap();
        let named = reg.next("endif", Some("End")).unwrap();
        assert_ne!(anon, named);
        assert_eq!(reg.count(), 1);
        assert_eq!(reg.label_of(&anon), None);
        assert_eq!(reg.label_of(&named), Some("End"));
    }

    #[test]
    fn duplicate_label_does_not_consume_counter() {
        let mut reg = IdentifierRegistry::new();
        reg.next("csel", Some("A")).unwrap();
        let err = reg.next("csel", Some("A")).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateLabel { .. }));
        assert_eq!(reg.current("csel").unwrap().as_str(), "csel1");
    }

    #[test]
    fn bind_rejects_taken_label() {
        let mut reg = IdentifierRegistry::new();
        reg.next("pi", Some("Cuff 0")).unwrap();
        assert!(reg.bind("Cuff 0", Identifier::new("pi1_csel1")).is_err());
        reg.bind("Cuff 0_SRC", Identifier::new("pi1_csel3")).unwrap();
        assert_eq!(reg.get("Cuff 0_SRC").unwrap().as_str(), "pi1_csel3");
    }

    #[test]
    fn digit_terminated_and_empty_prefixes_are_rejected() {
        let mut reg = IdentifierRegistry::new();
        for _ in 0..10 {
            reg.next("a", None).unwrap();
        }
        assert_eq!(reg.next("a", None).unwrap().as_str(), "a11");
        assert_eq!(
            reg.next("a1", None).unwrap_err(),
            RegistryError::InvalidPrefix { prefix: "a1".into() }
        );
        assert!(matches!(
            reg.next("", Some("x")),
            Err(RegistryError::InvalidPrefix { .. })
        ));
        assert!(!reg.has("x"));
    }

    #[test]
    fn next_skips_identifiers_bound_from_elsewhere() {
        let mut reg = IdentifierRegistry::new();
        reg.bind("promoted", Identifier::new("csel1")).unwrap();
        let issued = reg.next("csel", Some("A")).unwrap();
        assert_eq!(issued.as_str(), "csel2");
        assert_eq!(reg.label_of(&Identifier::new("csel1")), Some("promoted"));
        assert_eq!(reg.label_of(&issued), Some("A"));
    }

    #[test]
    fn bind_rejects_issued_or_bound_identifier() {
        let mut reg = IdentifierRegistry::new();
        let anon = reg.next("cyl", None).unwrap();
        assert_eq!(
            reg.bind("late", anon.clone()).unwrap_err(),
            RegistryError::DuplicateIdentifier {
                identifier: anon,
                label: "late".into(),
            }
        );
        reg.bind("first", Identifier::new("pi1_csel1")).unwrap();
        assert!(matches!(
            reg.bind("second", Identifier::new("pi1_csel1")),
            Err(RegistryError::DuplicateIdentifier { .. })
        ));
        assert!(!reg.has("late"));
        assert!(!reg.has("second"));
    }

    #[test]
    fn scoped_joins_with_underscore() {
        let outer = Identifier::new("pi2");
        let inner = Identifier::new("csel4");
        assert_eq!(outer.scoped(&inner).as_str(), "pi2_csel4");
    }

    #[test]
    fn labels_keep_binding_order() {
        let mut reg = IdentifierRegistry::new();
        reg.next("csel", Some("B")).unwrap();
        reg.next("csel", Some("A")).unwrap();
        let labels: Vec<_> = reg.labels().collect();
        assert_eq!(labels, vec!["B", "A"]);
    }
}
