//! Model instances: live values, the loaded snapshot, and the import/export
//! pipeline between them and plain records.
//!
//! An instance owns one slot per declared column plus, once it has been
//! hydrated from storage, a snapshot of the same shape. Slots are addressed by
//! the column's position in the shared [`TableMeta`], so no per-instance
//! schema exists and no runtime type inspection is needed beyond the declared
//! type tag.
//!
//! # Example
//!
//! ```
//! use ormbase_core::{record, ColumnOptions, ModelInstance, TableBuilder, Value};
//! use std::sync::Arc;
//!
//! let meta = Arc::new(
//!     TableBuilder::new("users")
//!         .column("id", ColumnOptions::new().primary_key().auto_increment())
//!         .column("name", ColumnOptions::new())
//!         .build(),
//! );
//!
//! let mut user = ModelInstance::with_meta(meta);
//! user.import_original(&record! { "id" => 1, "name" => "Ann" });
//! user.import_current(&record! { "id" => 1, "name" => "Ann" });
//! assert!(!user.has_changed());
//!
//! user.set("name", "Anna").unwrap();
//! assert!(user.has_changed());
//! assert_eq!(user.export().get("name"), Some(&Value::from("Anna")));
//! ```

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::field::ColumnDef;
use crate::meta::TableMeta;
use crate::options::{ExportOptions, ImportOptions};
use crate::record::Record;
use crate::registry::{Model, metadata};
use crate::value::{Value, string_value};

pub(crate) type Slots = Vec<Option<Value>>;

/// A model instance bound to its table metadata.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    meta: Arc<TableMeta>,
    values: Slots,
    original: Option<Slots>,
}

impl ModelInstance {
    /// Fresh instance of `M` with column defaults applied.
    pub fn new<M: Model>() -> Self {
        Self::with_meta(metadata::<M>())
    }

    /// Fresh instance over explicit metadata, with column defaults applied.
    pub fn with_meta(meta: Arc<TableMeta>) -> Self {
        let values = meta
            .columns()
            .iter()
            .map(|c| c.options.default.clone())
            .collect();
        Self {
            meta,
            values,
            original: None,
        }
    }

    /// Instance of `M` hydrated from a storage row: live values and snapshot
    /// both come from `record`.
    pub fn load<M: Model>(record: &Record) -> Self {
        let mut instance = Self::new::<M>();
        instance.import_current(record);
        instance.import_original(record);
        instance
    }

    pub fn meta(&self) -> &Arc<TableMeta> {
        &self.meta
    }

    pub fn table_name(&self) -> &str {
        self.meta.table_name()
    }

    pub fn columns(&self) -> &[ColumnDef] {
        self.meta.columns()
    }

    /// Storage column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.meta.column_names()
    }

    /// Live value of a property. `None` for unset slots and undeclared names.
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.meta
            .position(property)
            .and_then(|idx| self.values[idx].as_ref())
    }

    /// Snapshot value of a property.
    pub fn original(&self, property: &str) -> Option<&Value> {
        let idx = self.meta.position(property)?;
        self.original.as_ref()?[idx].as_ref()
    }

    /// Whether the instance was ever hydrated from storage.
    pub fn has_original(&self) -> bool {
        self.original.is_some()
    }

    /// Run the table's validity check against the current state.
    pub fn is_valid(&self) -> bool {
        (self.meta.validator())(self)
    }

    /// Assign a live value, returning the previous one.
    pub fn set(&mut self, property: &str, value: impl Into<Value>) -> Result<Option<Value>> {
        let idx = self.slot(property)?;
        Ok(self.values[idx].replace(value.into()))
    }

    /// Clear a live slot, returning the previous value.
    pub fn unset(&mut self, property: &str) -> Result<Option<Value>> {
        let idx = self.slot(property)?;
        Ok(self.values[idx].take())
    }

    fn slot(&self, property: &str) -> Result<usize> {
        self.meta
            .position(property)
            .ok_or_else(|| Error::UnknownProperty {
                table: self.meta.table_name().to_string(),
                property: property.to_string(),
            })
    }

    /// Live values keyed by property name, as stored (no coercion, no
    /// stringification). Unset slots are omitted.
    pub fn current_record(&self) -> Record {
        slots_to_record(&self.meta, &self.values)
    }

    /// Snapshot values keyed by property name, if a snapshot exists.
    pub fn original_record(&self) -> Option<Record> {
        self.original
            .as_ref()
            .map(|slots| slots_to_record(&self.meta, slots))
    }

    pub(crate) fn live_slots(&self) -> &[Option<Value>] {
        &self.values
    }

    pub(crate) fn original_slots(&self) -> Option<&[Option<Value>]> {
        self.original.as_deref()
    }

    // ========================================================================
    // Import
    // ========================================================================

    /// Import `record` into the live values.
    pub fn import_current(&mut self, record: &Record) {
        self.import_current_with(record, ImportOptions::default());
    }

    pub fn import_current_with(&mut self, record: &Record, options: ImportOptions) {
        fill_slots(&self.meta, record, options, &mut self.values);
    }

    /// Import `record` into the snapshot, creating it if absent.
    pub fn import_original(&mut self, record: &Record) {
        self.import_original_with(record, ImportOptions::default());
    }

    pub fn import_original_with(&mut self, record: &Record, options: ImportOptions) {
        let mut snapshot = self
            .original
            .clone()
            .unwrap_or_else(|| vec![None; self.meta.columns().len()]);
        fill_slots(&self.meta, record, options, &mut snapshot);
        self.original = Some(snapshot);
    }

    /// Copy another instance's live values, and its snapshot if it has one.
    ///
    /// `None` is a no-op. An instance without a snapshot never gives this
    /// one a fabricated snapshot.
    pub fn import(&mut self, other: Option<&ModelInstance>) {
        self.import_with(other, ImportOptions::default());
    }

    pub fn import_with(&mut self, other: Option<&ModelInstance>, options: ImportOptions) {
        let Some(other) = other else {
            return;
        };
        self.import_current_with(&other.current_record(), options);
        if let Some(snapshot) = other.original_record() {
            self.import_original_with(&snapshot, options);
        }
    }

    /// Import the fields of any serializable struct into the live values.
    pub fn import_serialize<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let record = Record::from_serialize(value)?;
        self.import_current(&record);
        Ok(())
    }

    /// Rebuild a typed struct from the live values.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        self.current_record().deserialize_into()
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Flatten observed, non-auto-increment columns into a record.
    pub fn export(&self) -> Record {
        self.export_with(ExportOptions::default())
    }

    /// Flatten the live values into a record of canonical strings.
    ///
    /// Ignored columns are skipped, and auto-increment columns unless
    /// requested. Truthy values are coerced and stringified; falsy values
    /// (null, `false`, zero, empty text) are passed through as they are.
    /// Unset slots are omitted.
    pub fn export_with(&self, options: ExportOptions) -> Record {
        let coercer = self.meta.coercer();
        let mut record = Record::with_capacity(self.values.len());
        for (col, slot) in self.meta.columns().iter().zip(&self.values) {
            if !col.is_observed() {
                continue;
            }
            if col.options.is_auto_increment() && !options.include_auto_increment {
                continue;
            }
            let Some(raw) = slot else {
                continue;
            };
            if raw.is_truthy() {
                let coerced = coercer.coerce(&col.options, Some(raw.clone()));
                record.insert(col.property.clone(), string_value(coerced.as_ref()));
            } else {
                record.insert(col.property.clone(), raw.clone());
            }
        }
        record
    }
}

/// Resolve the source field of `col`: storage column name, then property
/// name, then (optionally) the property name ignoring case.
fn resolve<'r>(col: &ColumnDef, record: &'r Record, options: ImportOptions) -> Option<&'r Value> {
    record
        .get(col.column_name())
        .or_else(|| record.get(&col.property))
        .or_else(|| {
            options
                .ignore_case
                .then(|| record.get_ignore_case(&col.property))
                .flatten()
        })
}

fn fill_slots(
    meta: &TableMeta,
    record: &Record,
    options: ImportOptions,
    slots: &mut [Option<Value>],
) {
    if !meta.is_mapped() {
        tracing::debug!(table = meta.table_name(), "No columns declared, nothing to import");
        return;
    }
    let coercer = meta.coercer();
    for (col, slot) in meta.columns().iter().zip(slots.iter_mut()) {
        let Some(raw) = resolve(col, record, options) else {
            tracing::debug!(
                table = meta.table_name(),
                property = %col.property,
                "No source field for property, leaving it untouched"
            );
            continue;
        };
        let revived = coercer.revive(raw.clone());
        *slot = coercer.coerce(&col.options, Some(revived));
    }
}

fn slots_to_record(meta: &TableMeta, slots: &[Option<Value>]) -> Record {
    meta.columns()
        .iter()
        .zip(slots)
        .filter_map(|(col, slot)| slot.clone().map(|v| (col.property.clone(), v)))
        .collect()
}
