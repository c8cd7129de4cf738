use serde::{Deserialize, Serialize};

/// The sub-entity level a named selection is imported at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Volumes.
    Domain,
    /// Surfaces bounding the volumes.
    Boundary,
    /// Vertices.
    Point,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Domain, EntityKind::Boundary, EntityKind::Point];

    /// Suffix the engine appends to an imported selection (`<sel>_dom`).
    pub fn suffix(self) -> &'static str {
        match self {
            EntityKind::Domain => "dom",
            EntityKind::Boundary => "bnd",
            EntityKind::Point => "pnt",
        }
    }

    /// Part-instance property holding the keep switch for this level.
    pub fn keep_property(self) -> &'static str {
        match self {
            EntityKind::Domain => "selkeepdom",
            EntityKind::Boundary => "selkeepbnd",
            EntityKind::Point => "selkeeppnt",
        }
    }
}

/// Per-kind keep/discard switches for one catalog entry.
///
/// Each kind is toggled independently: a selection may survive as a point
/// source while its domain is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KeepFlags {
    #[serde(default)]
    pub domain: bool,
    #[serde(default)]
    pub boundary: bool,
    #[serde(default)]
    pub point: bool,
}

impl KeepFlags {
    pub const NONE: KeepFlags = KeepFlags {
        domain: false,
        boundary: false,
        point: false,
    };
    pub const DOMAIN: KeepFlags = KeepFlags {
        domain: true,
        boundary: false,
        point: false,
    };
    pub const POINT: KeepFlags = KeepFlags {
        domain: false,
        boundary: false,
        point: true,
    };
    pub const DOMAIN_AND_BOUNDARY: KeepFlags = KeepFlags {
        domain: true,
        boundary: true,
        point: false,
    };
    pub const ALL: KeepFlags = KeepFlags {
        domain: true,
        boundary: true,
        point: true,
    };

    pub fn keeps(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Domain => self.domain,
            EntityKind::Boundary => self.boundary,
            EntityKind::Point => self.point,
        }
    }

    /// True when at least one level survives the import.
    pub fn retains_any(&self) -> bool {
        self.domain || self.boundary || self.point
    }

    /// Kinds that survive, in `EntityKind::ALL` order.
    pub fn kept_kinds(&self) -> Vec<EntityKind> {
        EntityKind::ALL
            .into_iter()
            .filter(|k| self.keeps(*k))
            .collect()
    }
}

impl From<bool> for KeepFlags {
    /// `true` keeps every level, `false` discards the selection entirely.
    fn from(keep: bool) -> Self {
        if keep {
            KeepFlags::ALL
        } else {
            KeepFlags::NONE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kept_kinds_follow_declaration_order() {
        let flags = KeepFlags {
            domain: true,
            boundary: false,
            point: true,
        };
        assert_eq!(flags.kept_kinds(), vec![EntityKind::Domain, EntityKind::Point]);
        assert!(flags.retains_any());
        assert!(!KeepFlags::NONE.retains_any());
    }

    #[test]
    fn bool_conversion_is_all_or_nothing() {
        assert_eq!(KeepFlags::from(true), KeepFlags::ALL);
        assert_eq!(KeepFlags::from(false), KeepFlags::NONE);
    }

    #[test]
    fn missing_fields_deserialize_as_discarded() {
        let flags: KeepFlags = serde_json::from_str(r#"{"point": true}"#).unwrap();
        assert_eq!(flags, KeepFlags::POINT);
    }
}
