use cuff_types::KeepFlags;
use serde::{Deserialize, Serialize};

use crate::registry::Identifier;
use crate::types::GraphError;

/// One named cumulative selection of a catalog, with the import policy
/// declared alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub label: String,
    pub id: Identifier,
    /// Which sub-entity levels survive when an instance imports this entry.
    pub keep: KeepFlags,
}

/// Ordered sequence of named selections declared up front by a recipe.
///
/// The order is a stable enumeration: instance keep vectors, point sources
/// and material assignments all address entries by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionCatalog {
    entries: Vec<CatalogEntry>,
}

impl SelectionCatalog {
    pub(crate) fn push(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`; out of range is a pairing defect, not a skip.
    pub fn get(&self, index: usize) -> Result<&CatalogEntry, GraphError> {
        self.entries
            .get(index)
            .ok_or(GraphError::CatalogIndexOutOfRange {
                index,
                count: self.entries.len(),
            })
    }

    pub fn label(&self, index: usize) -> Result<&str, GraphError> {
        self.get(index).map(|e| e.label.as_str())
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Declared keep policy, aligned with the catalog order.
    pub fn keep_vector(&self) -> Vec<KeepFlags> {
        self.entries.iter().map(|e| e.keep).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SelectionCatalog {
        let mut c = SelectionCatalog::default();
        c.push(CatalogEntry {
            label: "CUFF FINAL".into(),
            id: Identifier::new("csel1"),
            keep: KeepFlags::DOMAIN,
        });
        c.push(CatalogEntry {
            label: "SRC".into(),
            id: Identifier::new("csel2"),
            keep: KeepFlags::POINT,
        });
        c
    }

    #[test]
    fn index_addresses_declaration_order() {
        let c = catalog();
        assert_eq!(c.label(0).unwrap(), "CUFF FINAL");
        assert_eq!(c.label(1).unwrap(), "SRC");
        assert_eq!(c.position("SRC"), Some(1));
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let err = catalog().get(2).unwrap_err();
        assert_eq!(err, GraphError::CatalogIndexOutOfRange { index: 2, count: 2 });
    }

    #[test]
    fn keep_vector_is_aligned() {
        assert_eq!(catalog().keep_vector(), vec![KeepFlags::DOMAIN, KeepFlags::POINT]);
    }
}
