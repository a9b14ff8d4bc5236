//! Per-class table metadata and the builder used to declare it.
//!
//! A [`TableBuilder`] collects column declarations once per model type.
//! Declaring the same property twice merges the options, so a column can be
//! described piecemeal (`primary_key` in one call, `auto_increment` in
//! another). [`TableBuilder::build`] freezes the result into a [`TableMeta`],
//! which is shared read-only by every instance of the model.

use std::collections::HashMap;

use crate::coerce::{Coercer, TimeBasis};
use crate::field::{ColumnDef, ColumnOptions};
use crate::instance::ModelInstance;

/// Model-level validity check run by [`ModelInstance::is_valid`].
pub type Validator = fn(&ModelInstance) -> bool;

fn accept_all(_instance: &ModelInstance) -> bool {
    true
}

/// Immutable column metadata of one model type.
#[derive(Debug, Clone)]
pub struct TableMeta {
    table_name: String,
    type_name: Option<&'static str>,
    columns: Vec<ColumnDef>,
    positions: HashMap<String, usize>,
    coercer: Coercer,
    validator: Validator,
}

impl TableMeta {
    /// Storage table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Identifier of the declaring type, if declared through a type.
    pub fn type_name(&self) -> Option<&'static str> {
        self.type_name
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// False when no column was declared; such a table describes no entity.
    pub fn is_mapped(&self) -> bool {
        !self.columns.is_empty()
    }

    pub fn column(&self, property: &str) -> Option<&ColumnDef> {
        self.position(property).map(|idx| &self.columns[idx])
    }

    /// Slot index of a property.
    pub fn position(&self, property: &str) -> Option<usize> {
        self.positions.get(property).copied()
    }

    /// First declared property whose lowercased name equals `name` lowercased.
    pub fn find_ignore_case(&self, name: &str) -> Option<(usize, &ColumnDef)> {
        let wanted = name.to_lowercase();
        self.columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.property.to_lowercase() == wanted)
    }

    /// Storage column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(ColumnDef::column_name).collect()
    }

    /// Observed primary-key columns with their slot index. Ignored columns
    /// never take part in identity.
    pub fn primary_key_columns(&self) -> impl Iterator<Item = (usize, &ColumnDef)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_observed() && c.options.is_primary_key())
    }

    pub fn coercer(&self) -> &Coercer {
        &self.coercer
    }

    pub fn validator(&self) -> Validator {
        self.validator
    }
}

/// Declaration-time builder for [`TableMeta`].
#[derive(Debug, Clone)]
pub struct TableBuilder {
    table_name: String,
    type_name: Option<&'static str>,
    columns: Vec<ColumnDef>,
    basis: TimeBasis,
    validator: Validator,
}

impl TableBuilder {
    /// Start declaring a table that is not tied to a Rust type.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            type_name: None,
            columns: Vec::new(),
            basis: TimeBasis::default(),
            validator: accept_all,
        }
    }

    /// Start declaring the table of `M`, named after the type until
    /// [`table`](Self::table) says otherwise.
    pub fn for_type<M: ?Sized + 'static>() -> Self {
        let name = short_type_name(std::any::type_name::<M>());
        let mut builder = Self::new(name);
        builder.type_name = Some(name);
        builder
    }

    /// Set the storage table name.
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    /// Declare a column stored under its property name.
    pub fn column(self, property: impl Into<String>, options: ColumnOptions) -> Self {
        self.declare(ColumnDef::new(property).options(options))
    }

    /// Declare a column stored under an explicit column name.
    pub fn column_named(
        self,
        property: impl Into<String>,
        column: impl Into<String>,
        options: ColumnOptions,
    ) -> Self {
        self.declare(ColumnDef::new(property).column(column).options(options))
    }

    /// Add a column, or merge it onto an earlier declaration of the same
    /// property. An earlier explicit column name survives a later declaration
    /// that gives none.
    pub fn declare(mut self, def: ColumnDef) -> Self {
        if let Some(existing) = self.columns.iter_mut().find(|c| c.property == def.property) {
            if def.column.is_some() {
                existing.column = def.column;
            }
            existing.options.merge(def.options);
        } else {
            self.columns.push(def);
        }
        self
    }

    /// Zone used for date revival and midnight normalization.
    pub fn time_basis(mut self, basis: TimeBasis) -> Self {
        self.basis = basis;
        self
    }

    /// Check applied by [`ModelInstance::is_valid`]. Tables accept every
    /// instance unless told otherwise.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn build(self) -> TableMeta {
        let positions = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.property.clone(), idx))
            .collect();
        TableMeta {
            table_name: self.table_name,
            type_name: self.type_name,
            columns: self.columns,
            positions,
            coercer: Coercer::new(self.basis),
            validator: self.validator,
        }
    }
}

/// `my_crate::models::User<T>` -> `User`
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
