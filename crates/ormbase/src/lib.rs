//! ormbase: a metadata-driven model base layer.
//!
//! Model types declare their columns once (primary keys, auto-increment,
//! logical type, defaults, ignored columns). Instances then import plain
//! records from storage, keep the loaded values as a snapshot, report which
//! properties changed, and export themselves back to plain records.
//!
//! This crate is the facade over `ormbase-core`: it re-exports the public API
//! and adds the [`model!`] declaration macro and a [`prelude`].
//!
//! # Example
//!
//! ```
//! use ormbase::prelude::*;
//!
//! struct User;
//!
//! ormbase::model! {
//!     User as "users" {
//!         "id" => ColumnOptions::new().primary_key().auto_increment(),
//!         "name" => ColumnOptions::new(),
//!         "createdAt" @ "created_at" => ColumnOptions::new().column_type(ColumnType::Date),
//!     }
//! }
//!
//! let mut user = ModelInstance::load::<User>(&record! { "id" => 1, "name" => "Ann" });
//! assert!(!user.has_changed());
//!
//! user.set("name", "Anna").unwrap();
//! let changes = user.changes();
//! assert_eq!(changes.get("name").unwrap().previous, "Ann");
//! ```

mod macros;

pub use ormbase_core::{
    Change, ChangeSet, Coercer, ColumnDef, ColumnOptions, ColumnType, Error, ExportOptions,
    ImportOptions, KeyOptions, Model, ModelInstance, Record, Registry, Result, TableBuilder,
    TableMeta, TimeBasis, Validator, Value, ZERO_DATE, coerce, columns_of, metadata, record,
    string_value, table_name_of,
};

/// Modules of the core crate, for callers that need the full paths.
pub mod core {
    pub use ormbase_core::{
        coerce, error, field, instance, keys, meta, options, record, registry, tracking, value,
    };
}

/// Everything needed to declare and use models.
pub mod prelude {
    pub use crate::model;
    pub use ormbase_core::{
        Change, ChangeSet, ColumnOptions, ColumnType, Error, ExportOptions, ImportOptions,
        KeyOptions, Model, ModelInstance, Record, Result, TableBuilder, TimeBasis, Value, record,
    };
}
