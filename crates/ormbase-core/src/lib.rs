//! Core types and change-tracking engine for ormbase.
//!
//! `ormbase-core` is the **foundation layer**: it holds the column metadata of
//! model types, the instances built on top of it, and every transformation
//! between instances and plain records.
//!
//! # Role In The Architecture
//!
//! - **Declaration**: `Model` and `TableBuilder` describe a type's columns once;
//!   the result is published as a shared, immutable `TableMeta`.
//! - **Data model**: `Value` and `Record` are the plain-record contract with
//!   storage drivers and HTTP layers.
//! - **Tracking**: `ModelInstance` keeps live values next to the snapshot
//!   loaded from storage, and answers `has_changed` / `changes` by comparing
//!   coerced canonical strings.
//! - **Keys**: primary-key maps and where objects for query collaborators.
//!
//! Nothing here talks to a database; drivers consume the records produced by
//! `export`, `primary_keys_and_values` and `where_object`.
//!
//! Most applications should use the `ormbase` facade.

pub mod coerce;
pub mod error;
pub mod field;
pub mod instance;
pub mod keys;
pub mod meta;
pub mod options;
pub mod record;
pub mod registry;
pub mod tracking;
pub mod value;

pub use coerce::{Coercer, TimeBasis, ZERO_DATE, coerce};
pub use error::{Error, Result};
pub use field::{ColumnDef, ColumnOptions, ColumnType};
pub use instance::ModelInstance;
pub use meta::{TableBuilder, TableMeta, Validator};
pub use options::{ExportOptions, ImportOptions, KeyOptions};
pub use record::Record;
pub use registry::{Model, Registry, columns_of, metadata, table_name_of};
pub use tracking::{Change, ChangeSet};
pub use value::{Value, string_value};
