//! Column definitions and their declaration options.

use std::fmt;

use crate::value::Value;

/// Logical type tag of a column, used only to pick a coercion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnType {
    /// No coercion.
    #[default]
    None,
    /// Calendar date, normalized to local midnight.
    Date,
    /// Structured payload parsed from text.
    Json,
    /// Loose numeric value.
    Number,
    /// Loose boolean value.
    Boolean,
}

impl ColumnType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::None => "none",
            ColumnType::Date => "date",
            ColumnType::Json => "json",
            ColumnType::Number => "number",
            ColumnType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options attached to a column declaration.
///
/// Every option is tri-state: unset, or explicitly set to a value. Merging a
/// later declaration only overwrites the options it explicitly sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnOptions {
    pub primary_key: Option<bool>,
    pub auto_increment: Option<bool>,
    pub ignore: Option<bool>,
    pub column_type: Option<ColumnType>,
    pub default: Option<Value>,
}

impl ColumnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark as primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = Some(true);
        self
    }

    /// Mark as auto-incrementing.
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = Some(true);
        self
    }

    /// Exclude from export, dirty checks and key derivation. Imports still
    /// populate the column.
    pub fn ignore(mut self) -> Self {
        self.ignore = Some(true);
        self
    }

    pub fn column_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = Some(column_type);
        self
    }

    /// Value placed in the live slot when an instance is constructed.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key.unwrap_or(false)
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment.unwrap_or(false)
    }

    pub fn is_ignored(&self) -> bool {
        self.ignore.unwrap_or(false)
    }

    pub fn effective_type(&self) -> ColumnType {
        self.column_type.unwrap_or_default()
    }

    /// Merge `later` onto `self`; explicitly set options in `later` win.
    pub fn merge(&mut self, later: ColumnOptions) {
        if later.primary_key.is_some() {
            self.primary_key = later.primary_key;
        }
        if later.auto_increment.is_some() {
            self.auto_increment = later.auto_increment;
        }
        if later.ignore.is_some() {
            self.ignore = later.ignore;
        }
        if later.column_type.is_some() {
            self.column_type = later.column_type;
        }
        if later.default.is_some() {
            self.default = later.default;
        }
    }
}

/// A declared correspondence between a model property and a storage column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Property name on the model.
    pub property: String,
    /// Storage-side column name, when it differs from the property name.
    pub column: Option<String>,
    pub options: ColumnOptions,
}

impl ColumnDef {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            column: None,
            options: ColumnOptions::default(),
        }
    }

    /// Set the storage column name.
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column = Some(name.into());
        self
    }

    pub fn options(mut self, options: ColumnOptions) -> Self {
        self.options = options;
        self
    }

    /// Storage column name, falling back to the property name.
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.property)
    }

    /// Whether dirty checks, export and key derivation observe this column.
    pub fn is_observed(&self) -> bool {
        !self.options.is_ignored()
    }
}
