//! Partial UPDATE `SET` clause generation.
//!
//! [`sql_for_partial_update`] turns a sparse, ordered set of `(field, value)`
//! pairs into a `SET` assignment list with `$1, $2, ...` placeholders and the
//! matching parameter list.
//!
//! # Example
//!
//! ```ignore
//! use jobly::{FieldNameMap, UpdateRequest, sql_for_partial_update};
//!
//! let mut update = UpdateRequest::new();
//! update.set("firstName", "John").set("age", 30_i32);
//!
//! let clause = sql_for_partial_update(&update, &FieldNameMap::new(&[("firstName", "first_name")]))?;
//! assert_eq!(clause.set_cols(), r#""first_name"=$1, "age"=$2"#);
//! assert_eq!(clause.len(), 2);
//! ```

use crate::error::{JoblyError, JoblyResult};
use crate::field_map::FieldNameMap;
use crate::ident::Ident;
use crate::query::SqlParam;
use std::fmt::Write;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// An ordered list of field assignments supplied by the caller.
///
/// Order is significant: it fixes the placeholder numbering of the generated
/// clause. Setting a field twice keeps its first position and the latest value.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    fields: Vec<(String, SqlParam)>,
}

impl UpdateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field.
    pub fn set<T>(&mut self, field: &str, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.set_value(field, Arc::new(value))
    }

    /// Set an optional field (None => skip).
    pub fn set_opt<T>(&mut self, field: &str, value: Option<T>) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        if let Some(v) = value {
            self.set(field, v);
        }
        self
    }

    pub(crate) fn set_value(&mut self, field: &str, value: SqlParam) -> &mut Self {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some(existing) => existing.1 = value,
            None => self.fields.push((field.to_string(), value)),
        }
        self
    }

    /// Field names in assignment order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A rendered `SET` assignment list plus its parameters, in placeholder order.
#[derive(Debug, Clone)]
pub struct ParameterizedClause {
    set_cols: String,
    values: Vec<SqlParam>,
}

impl ParameterizedClause {
    /// The assignment list, e.g. `"first_name"=$1, "age"=$2`.
    pub fn set_cols(&self) -> &str {
        &self.set_cols
    }

    /// Bound values; `values()[i]` belongs to placeholder `$i+1`.
    pub fn values(&self) -> &[SqlParam] {
        &self.values
    }

    /// Number of placeholders (and values) in the clause.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the first placeholder free for use after the clause.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }

    pub fn into_parts(self) -> (String, Vec<SqlParam>) {
        (self.set_cols, self.values)
    }
}

/// Reject `update` when any of its fields resolves to the column `protected`.
///
/// Repositories use this to keep identity columns out of raw update requests.
pub fn ensure_unassigned(
    update: &UpdateRequest,
    names: &FieldNameMap,
    protected: &str,
) -> JoblyResult<()> {
    match update
        .field_names()
        .find(|field| names.resolve(field) == protected)
    {
        Some(field) => Err(JoblyError::validation(format!(
            "{field} cannot be updated"
        ))),
        None => Ok(()),
    }
}

/// Generate the `SET` clause for a partial update.
///
/// Each field is resolved through `names` (unmapped fields are used verbatim),
/// quoted, and assigned the next positional placeholder. Values are passed
/// through untouched.
///
/// Returns [`JoblyError::Validation`] when `update` is empty.
pub fn sql_for_partial_update(
    update: &UpdateRequest,
    names: &FieldNameMap,
) -> JoblyResult<ParameterizedClause> {
    if update.is_empty() {
        return Err(JoblyError::validation("No data"));
    }

    let mut set_cols = String::new();
    let mut values = Vec::with_capacity(update.len());

    for (idx, (field, value)) in update.fields.iter().enumerate() {
        if idx > 0 {
            set_cols.push_str(", ");
        }
        Ident::quoted(names.resolve(field))?.write_sql(&mut set_cols);
        let _ = write!(&mut set_cols, "=${}", idx + 1);
        values.push(Arc::clone(value));
    }

    Ok(ParameterizedClause { set_cols, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debug_values(clause: &ParameterizedClause) -> Vec<String> {
        clause.values().iter().map(|v| format!("{v:?}")).collect()
    }

    #[test]
    fn works_with_valid_inputs() {
        let mut update = UpdateRequest::new();
        update.set("firstName", "John".to_string()).set("age", 30_i32);

        let names = FieldNameMap::new(&[("firstName", "first_name")]);
        let clause = sql_for_partial_update(&update, &names).unwrap();

        assert_eq!(clause.set_cols(), r#""first_name"=$1, "age"=$2"#);
        assert_eq!(debug_values(&clause), vec![r#""John""#, "30"]);
        assert_eq!(clause.next_placeholder(), 3);
    }

    #[test]
    fn works_with_no_mappings() {
        let mut update = UpdateRequest::new();
        update.set("firstName", "John".to_string()).set("age", 30_i32);

        let clause = sql_for_partial_update(&update, &FieldNameMap::identity()).unwrap();

        assert_eq!(clause.set_cols(), r#""firstName"=$1, "age"=$2"#);
        assert_eq!(debug_values(&clause), vec![r#""John""#, "30"]);
    }

    #[test]
    fn empty_update_is_rejected_regardless_of_names() {
        let update = UpdateRequest::new();

        let err = sql_for_partial_update(&update, &FieldNameMap::identity()).unwrap_err();
        assert!(err.is_validation());

        let names = FieldNameMap::new(&[("firstName", "first_name")]);
        let err = sql_for_partial_update(&update, &names).unwrap_err();
        assert!(matches!(err, JoblyError::Validation(msg) if msg == "No data"));
    }

    #[test]
    fn placeholders_follow_request_order() {
        let fields = ["e", "d", "c", "b", "a"];
        for n in 1..=fields.len() {
            let mut update = UpdateRequest::new();
            for (i, field) in fields.iter().take(n).enumerate() {
                update.set(field, i as i64);
            }

            let clause = sql_for_partial_update(&update, &FieldNameMap::identity()).unwrap();
            let fragments: Vec<&str> = clause.set_cols().split(", ").collect();

            assert_eq!(fragments.len(), n);
            assert_eq!(clause.len(), n);
            for (i, fragment) in fragments.iter().enumerate() {
                assert_eq!(*fragment, format!("\"{}\"=${}", fields[i], i + 1));
            }
            let expected: Vec<String> = (0..n).map(|i| i.to_string()).collect();
            assert_eq!(debug_values(&clause), expected);
        }
    }

    #[test]
    fn repeated_field_keeps_first_position() {
        let mut update = UpdateRequest::new();
        update
            .set("title", "a".to_string())
            .set("salary", 1_i32)
            .set("title", "b".to_string());

        assert_eq!(update.len(), 2);
        assert_eq!(update.field_names().collect::<Vec<_>>(), vec!["title", "salary"]);

        let clause = sql_for_partial_update(&update, &FieldNameMap::identity()).unwrap();
        assert_eq!(clause.set_cols(), r#""title"=$1, "salary"=$2"#);
        assert_eq!(debug_values(&clause), vec![r#""b""#, "1"]);
    }

    #[test]
    fn set_opt_skips_none() {
        let mut update = UpdateRequest::new();
        update
            .set_opt("title", Some("x".to_string()))
            .set_opt::<i32>("salary", None);

        assert_eq!(update.field_names().collect::<Vec<_>>(), vec!["title"]);
    }

    #[test]
    fn protected_column_is_detected_through_mapping() {
        let names = FieldNameMap::new(&[("companyHandle", "company_handle")]);

        let mut update = UpdateRequest::new();
        update.set("title", "x".to_string());
        assert!(ensure_unassigned(&update, &names, "id").is_ok());

        update.set("id", 42_i32);
        let err = ensure_unassigned(&update, &names, "id").unwrap_err();
        assert!(matches!(err, JoblyError::Validation(msg) if msg == "id cannot be updated"));

        let mut update = UpdateRequest::new();
        update.set("companyHandle", "c2".to_string());
        assert!(ensure_unassigned(&update, &names, "company_handle").is_err());
    }

    #[test]
    fn mapped_names_are_quoted() {
        let mut update = UpdateRequest::new();
        update.set("odd", 1_i32);

        let names = FieldNameMap::new(&[("odd", r#"we"ird"#)]);
        let clause = sql_for_partial_update(&update, &names).unwrap();
        assert_eq!(clause.set_cols(), r#""we""ird"=$1"#);
    }
}
