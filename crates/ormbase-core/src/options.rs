//! Flags for import, export and key extraction.
//!
//! All options default to `false`, which is the behavior of the plain
//! (`import_current`, `export`, ...) methods.

/// How source fields are resolved during import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Fall back to a case-insensitive match on the property name.
    pub ignore_case: bool,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }
}

/// What `export` includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Include auto-increment columns.
    pub include_auto_increment: bool,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_auto_increment(mut self) -> Self {
        self.include_auto_increment = true;
        self
    }
}

/// Source and shape of primary-key extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOptions {
    /// Read from the snapshot instead of live values.
    pub use_original: bool,
    /// Return canonical strings instead of coerced values.
    pub as_string: bool,
    /// Only primary-key columns that are also auto-increment.
    pub only_auto_increment: bool,
}

impl KeyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_original(mut self) -> Self {
        self.use_original = true;
        self
    }

    pub fn as_string(mut self) -> Self {
        self.as_string = true;
        self
    }

    pub fn only_auto_increment(mut self) -> Self {
        self.only_auto_increment = true;
        self
    }
}
