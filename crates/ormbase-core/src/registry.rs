//! Model declaration and the per-type metadata registry.
//!
//! Every model type declares its table once through [`Model::declare`]. The
//! first lookup builds the metadata and publishes it as an `Arc<TableMeta>`
//! keyed by the type's `TypeId`; every later lookup and every instance shares
//! that same immutable value.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::field::ColumnDef;
use crate::instance::ModelInstance;
use crate::meta::{TableBuilder, TableMeta};

/// A type whose instances map to rows of a table.
///
/// ```
/// use ormbase_core::{ColumnOptions, ColumnType, Model, TableBuilder};
///
/// struct User;
///
/// impl Model for User {
///     fn declare(table: TableBuilder) -> TableBuilder {
///         table
///             .table("users")
///             .column("id", ColumnOptions::new().primary_key().auto_increment())
///             .column("name", ColumnOptions::new())
///             .column_named("createdAt", "created_at", ColumnOptions::new().column_type(ColumnType::Date))
///     }
/// }
///
/// assert_eq!(ormbase_core::table_name_of::<User>(), "users");
/// ```
pub trait Model: 'static {
    /// Describe the table. `table` starts out named after the type.
    fn declare(table: TableBuilder) -> TableBuilder;

    /// Whether an instance holds an acceptable state. Every instance is
    /// valid unless the model says otherwise.
    fn is_valid(_instance: &ModelInstance) -> bool {
        true
    }
}

/// Published table metadata keyed by model type.
#[derive(Debug, Default)]
pub struct Registry {
    tables: RwLock<HashMap<TypeId, Arc<TableMeta>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by [`metadata`].
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(Registry::new)
    }

    /// Metadata of `M`, declaring and publishing it on first use.
    pub fn get_or_declare<M: Model>(&self) -> Arc<TableMeta> {
        if let Some(meta) = self.lookup::<M>() {
            return meta;
        }
        // Build outside the lock; if another caller published first, theirs wins.
        let meta = M::declare(TableBuilder::for_type::<M>())
            .validator(M::is_valid)
            .build();
        self.publish(TypeId::of::<M>(), meta)
    }

    /// Publish metadata for `T` built elsewhere. An existing entry is kept.
    pub fn register<T: ?Sized + 'static>(&self, meta: TableMeta) -> Arc<TableMeta> {
        self.publish(TypeId::of::<T>(), meta)
    }

    pub fn lookup<T: ?Sized + 'static>(&self) -> Option<Arc<TableMeta>> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.get(&TypeId::of::<T>()).cloned()
    }

    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn publish(&self, key: TypeId, meta: TableMeta) -> Arc<TableMeta> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let published = tables.entry(key).or_insert_with(|| {
            tracing::debug!(
                table = meta.table_name(),
                columns = meta.columns().len(),
                "Published table metadata"
            );
            Arc::new(meta)
        });
        Arc::clone(published)
    }
}

/// Shared metadata of `M` from the global registry.
pub fn metadata<M: Model>() -> Arc<TableMeta> {
    Registry::global().get_or_declare::<M>()
}

/// Declared columns of `M` in declaration order.
pub fn columns_of<M: Model>() -> Vec<ColumnDef> {
    metadata::<M>().columns().to_vec()
}

/// Table name of `M`.
pub fn table_name_of<M: Model>() -> String {
    metadata::<M>().table_name().to_string()
}
