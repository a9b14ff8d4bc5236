//! Identity tuples and lookup predicates derived from declared columns.

use crate::instance::ModelInstance;
use crate::options::KeyOptions;
use crate::record::Record;
use crate::value::{Value, string_value};

impl ModelInstance {
    /// Primary-key values keyed by storage column name.
    ///
    /// Values are always coerced; with `as_string` they are then rendered as
    /// canonical strings. Unset slots come back as `Null` (or `"undefined"`
    /// as a string). Returns `None` when the table declares no columns at
    /// all, which is distinct from a mapped table without primary keys
    /// (`Some` of an empty record).
    pub fn primary_keys_and_values(&self, options: KeyOptions) -> Option<Record> {
        let meta = self.meta();
        if !meta.is_mapped() {
            return None;
        }
        let coercer = meta.coercer();
        let slots = if options.use_original {
            self.original_slots().unwrap_or(&[])
        } else {
            self.live_slots()
        };

        let mut keys = Record::new();
        for (idx, col) in meta.primary_key_columns() {
            if options.only_auto_increment && !col.options.is_auto_increment() {
                continue;
            }
            let raw = slots.get(idx).cloned().flatten();
            let coerced = coercer.coerce(&col.options, raw);
            let value = if options.as_string {
                Value::Text(string_value(coerced.as_ref()))
            } else {
                coerced.unwrap_or(Value::Null)
            };
            keys.insert(col.column_name(), value);
        }
        Some(keys)
    }

    /// Coerced live values for the named properties, for use as a lookup
    /// filter.
    ///
    /// Names are matched case-insensitively against declared properties and
    /// the output is keyed by the declared spelling. Unknown and ignored
    /// names are skipped with a warning.
    pub fn where_object(&self, properties: &[&str]) -> Record {
        let meta = self.meta();
        let coercer = meta.coercer();
        let mut filter = Record::new();
        for name in properties {
            let Some((idx, col)) = meta.find_ignore_case(name) else {
                tracing::warn!(
                    table = meta.table_name(),
                    property = *name,
                    "Property not declared, skipping in where object"
                );
                continue;
            };
            if !col.is_observed() {
                tracing::warn!(
                    table = meta.table_name(),
                    property = %col.property,
                    "Property is ignored, skipping in where object"
                );
                continue;
            }
            let raw = self.live_slots()[idx].clone();
            let value = coercer.coerce(&col.options, raw).unwrap_or(Value::Null);
            filter.insert(col.property.clone(), value);
        }
        filter
    }
}
