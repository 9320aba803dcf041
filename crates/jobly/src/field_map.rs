//! Logical field name → storage column name mapping.

/// A static mapping from logical (API-facing) field names to column names.
///
/// Fields that have no entry pass through unchanged, so a map only needs to
/// list the names that actually differ.
///
/// # Example
/// ```ignore
/// use jobly::FieldNameMap;
///
/// static JOB_COLUMNS: FieldNameMap = FieldNameMap::new(&[("companyHandle", "company_handle")]);
///
/// assert_eq!(JOB_COLUMNS.resolve("companyHandle"), "company_handle");
/// assert_eq!(JOB_COLUMNS.resolve("title"), "title");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldNameMap {
    entries: &'static [(&'static str, &'static str)],
}

impl FieldNameMap {
    /// Build a map from `(field, column)` pairs.
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// A map with no entries; every field resolves to itself.
    pub const fn identity() -> Self {
        Self { entries: &[] }
    }

    /// Column name for `field`, or `field` itself when unmapped.
    pub fn resolve<'a>(&self, field: &'a str) -> &'a str {
        match self.get(field) {
            Some(column) => column,
            None => field,
        }
    }

    /// Column name for `field`, if it has an entry.
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(logical, _)| *logical == field)
            .map(|(_, column)| *column)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FieldNameMap {
    fn default() -> Self {
        Self::identity()
    }
}
