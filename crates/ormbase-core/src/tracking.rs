//! Dirty checking against the loaded snapshot.
//!
//! Live and snapshot values are compared through their coerced canonical
//! strings, never structurally. A timestamp and the ISO string for the same
//! instant, or `Int(5)` and `Text("5")`, are therefore equal: storage round
//! trips routinely change a value's representation without changing it.

use serde::Serialize;
use serde::ser::SerializeMap;

use crate::instance::ModelInstance;
use crate::value::string_value;

/// Canonical before/after strings of one changed property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub current: String,
    pub previous: String,
}

/// Changed properties in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<(String, Change)>,
}

impl ChangeSet {
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn get(&self, property: &str) -> Option<&Change> {
        self.changes
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, c)| c)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.get(property).is_some()
    }

    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.changes.iter().map(|(p, _)| p.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Change)> {
        self.changes.iter().map(|(p, c)| (p.as_str(), c))
    }
}

impl IntoIterator for ChangeSet {
    type Item = (String, Change);
    type IntoIter = std::vec::IntoIter<(String, Change)>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl Serialize for ChangeSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.changes.len()))?;
        for (property, change) in &self.changes {
            map.serialize_entry(property, change)?;
        }
        map.end()
    }
}

impl ModelInstance {
    /// Whether any observed column differs from the snapshot.
    ///
    /// Always `false` for an instance that was never hydrated.
    pub fn has_changed(&self) -> bool {
        self.compare().next().is_some()
    }

    /// Every observed column that differs from the snapshot.
    ///
    /// Empty for an instance that was never hydrated.
    pub fn changes(&self) -> ChangeSet {
        ChangeSet {
            changes: self.compare().collect(),
        }
    }

    /// Lazily yields differing observed columns, so `has_changed` stops at
    /// the first one.
    fn compare(&self) -> impl Iterator<Item = (String, Change)> + '_ {
        let meta = self.meta();
        let coercer = meta.coercer();
        let original = self.original_slots().unwrap_or(&[]);
        meta.columns()
            .iter()
            .zip(self.live_slots())
            .zip(original)
            .filter(|((col, _), _)| col.is_observed())
            .filter_map(move |((col, live), previous)| {
                let current = string_value(coercer.coerce(&col.options, live.clone()).as_ref());
                let previous =
                    string_value(coercer.coerce(&col.options, previous.clone()).as_ref());
                if current == previous {
                    return None;
                }
                tracing::trace!(
                    table = meta.table_name(),
                    property = %col.property,
                    current = %current,
                    previous = %previous,
                    "Property differs from snapshot"
                );
                Some((col.property.clone(), Change { current, previous }))
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, FixedOffset};

    use crate::coerce::TimeBasis;
    use crate::field::{ColumnOptions, ColumnType};
    use crate::instance::ModelInstance;
    use crate::meta::{TableBuilder, TableMeta};
    use crate::record;
    use crate::value::Value;

    fn meta() -> Arc<TableMeta> {
        Arc::new(
            TableBuilder::new("posts")
                .column("id", ColumnOptions::new().primary_key())
                .column("title", ColumnOptions::new())
                .column("views", ColumnOptions::new().column_type(ColumnType::Number))
                .column("seen", ColumnOptions::new().ignore())
                .column(
                    "publishedAt",
                    ColumnOptions::new().column_type(ColumnType::Date),
                )
                .time_basis(TimeBasis::Fixed(FixedOffset::east_opt(3600).unwrap()))
                .build(),
        )
    }

    fn loaded() -> ModelInstance {
        let mut m = ModelInstance::with_meta(meta());
        let row = record! { "id" => 1, "title" => "Hello", "views" => 10, "seen" => true };
        m.import_current(&row);
        m.import_original(&row);
        m
    }

    #[test]
    fn test_no_snapshot_means_no_changes() {
        let mut m = ModelInstance::with_meta(meta());
        m.set("title", "anything").unwrap();
        assert!(!m.has_changed());
        assert!(m.changes().is_empty());
    }

    #[test]
    fn test_unchanged_after_load() {
        let m = loaded();
        assert!(!m.has_changed());
        assert!(m.changes().is_empty());
    }

    #[test]
    fn test_detects_change() {
        let mut m = loaded();
        m.set("title", "Bye").unwrap();
        assert!(m.has_changed());

        let changes = m.changes();
        assert_eq!(changes.len(), 1);
        let change = changes.get("title").unwrap();
        assert_eq!(change.current, "Bye");
        assert_eq!(change.previous, "Hello");
    }

    #[test]
    fn test_ignored_columns_are_not_observed() {
        let mut m = loaded();
        m.set("seen", false).unwrap();
        assert!(!m.has_changed());
    }

    #[test]
    fn test_loose_equality_across_representations() {
        let mut m = loaded();
        m.set("views", "10").unwrap();
        m.set("title", "  Hello ").unwrap();
        assert!(!m.has_changed());
    }

    #[test]
    fn test_timestamp_equals_its_iso_string() {
        let mut m = loaded();
        let ts = DateTime::parse_from_rfc3339("2024-03-05T00:00:00+01:00").unwrap();
        m.import_original(&record! { "publishedAt" => Value::Timestamp(ts) });
        m.set("publishedAt", "2024-03-04T23:00:00.000Z").unwrap();
        assert!(!m.has_changed());
    }

    #[test]
    fn test_unset_versus_null_differs() {
        let mut m = loaded();
        m.import_original(&record! { "publishedAt" => Value::Null });
        let changes = m.changes();
        let change = changes.get("publishedAt").unwrap();
        assert_eq!(change.current, "undefined");
        assert_eq!(change.previous, "null");
    }

    #[test]
    fn test_changes_in_declaration_order_and_serialize() {
        let mut m = loaded();
        m.set("views", 11).unwrap();
        m.set("title", "Bye").unwrap();
        let changes = m.changes();
        assert_eq!(changes.properties().collect::<Vec<_>>(), vec!["title", "views"]);
        assert_eq!(
            serde_json::to_value(&changes).unwrap(),
            serde_json::json!({
                "title": {"current": "Bye", "previous": "Hello"},
                "views": {"current": "11", "previous": "10"}
            })
        );
    }
}
