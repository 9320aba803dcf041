//! Conjunctive WHERE predicate builder for optional filter criteria.
//!
//! Each resource filter appends its present criteria to a [`PredicateSet`] in a
//! fixed order; absent criteria add nothing. Placeholders are numbered as the
//! predicates are appended, so numbering always matches the parameter order.

use crate::query::SqlParam;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Ordered `AND`-joined predicates plus their bound values.
#[derive(Debug, Clone, Default)]
pub struct PredicateSet {
    /// Predicates (without leading AND)
    conditions: Vec<String>,
    /// Parameter values
    params: Vec<SqlParam>,
    /// Current parameter counter (starts from offset)
    param_count: usize,
}

impl PredicateSet {
    /// Create an empty set with param numbering starting at 1.
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Create an empty set with param numbering starting after `offset`.
    ///
    /// For example, `with_offset(2)` means the first param will be `$3`.
    pub fn with_offset(offset: usize) -> Self {
        Self {
            conditions: Vec::new(),
            params: Vec::new(),
            param_count: offset,
        }
    }

    /// Highest placeholder index used so far (the offset when nothing is bound).
    pub fn param_count(&self) -> usize {
        self.param_count
    }

    /// Check if any predicates have been added.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Number of predicates.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Predicates in the order they were appended.
    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    /// Bound values in placeholder order.
    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    pub fn into_params(self) -> Vec<SqlParam> {
        self.params
    }

    /// Predicates joined with `AND` (without the `WHERE` keyword).
    pub fn build_clause(&self) -> String {
        self.conditions.join(" AND ")
    }

    /// ` WHERE a AND b`, or an empty string when there are no predicates.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.build_clause())
        }
    }

    fn add_condition<T>(&mut self, col: &str, op: &str, value: T)
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.param_count += 1;
        self.conditions
            .push(format!("{} {} ${}", col, op, self.param_count));
        self.params.push(Arc::new(value));
    }

    /// Add a case-insensitive substring match: `col ILIKE '%value%'`.
    pub fn and_contains(&mut self, col: &str, value: &str) -> &mut Self {
        self.add_condition(col, "ILIKE", format!("%{value}%"));
        self
    }

    /// Add an inclusive lower bound: `col >= value`.
    pub fn and_gte<T>(&mut self, col: &str, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.add_condition(col, ">=", value);
        self
    }

    /// Add an inclusive upper bound: `col <= value`.
    pub fn and_lte<T>(&mut self, col: &str, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.add_condition(col, "<=", value);
        self
    }

    /// Add `col > 0`. Binds no parameter.
    pub fn and_positive(&mut self, col: &str) -> &mut Self {
        self.conditions.push(format!("{} > 0", col));
        self
    }

    // ==================== Option-friendly helpers ====================

    pub fn and_contains_opt(&mut self, col: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            self.and_contains(col, v);
        }
        self
    }

    pub fn and_gte_opt<T>(&mut self, col: &str, value: Option<T>) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        if let Some(v) = value {
            self.and_gte(col, v);
        }
        self
    }

    pub fn and_lte_opt<T>(&mut self, col: &str, value: Option<T>) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        if let Some(v) = value {
            self.and_lte(col, v);
        }
        self
    }

    /// Add `col > 0` only when `flag` is `Some(true)`.
    pub fn and_positive_if(&mut self, col: &str, flag: Option<bool>) -> &mut Self {
        if flag == Some(true) {
            self.and_positive(col);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debug_params(set: &PredicateSet) -> Vec<String> {
        set.params().iter().map(|p| format!("{p:?}")).collect()
    }

    #[test]
    fn empty_set_renders_no_where() {
        let set = PredicateSet::new();
        assert!(set.is_empty());
        assert_eq!(set.where_clause(), "");
        assert_eq!(set.build_clause(), "");
        assert_eq!(set.param_count(), 0);
    }

    #[test]
    fn numbers_placeholders_in_append_order() {
        let mut set = PredicateSet::new();
        set.and_contains("title", "Job")
            .and_gte("salary", 200_000_i32)
            .and_positive("equity");

        assert_eq!(
            set.where_clause(),
            " WHERE title ILIKE $1 AND salary >= $2 AND equity > 0"
        );
        assert_eq!(debug_params(&set), vec![r#""%Job%""#, "200000"]);
        assert_eq!(set.param_count(), 2);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn absent_criteria_take_no_placeholder() {
        let mut set = PredicateSet::new();
        set.and_contains_opt("title", None)
            .and_gte_opt("salary", Some(10_i32))
            .and_lte_opt::<i32>("salary", None)
            .and_positive_if("equity", Some(false));

        assert_eq!(set.conditions(), &["salary >= $1".to_string()]);
        assert_eq!(debug_params(&set), vec!["10"]);
    }

    #[test]
    fn flag_without_bound_values() {
        let mut set = PredicateSet::new();
        set.and_positive_if("equity", Some(true));

        assert_eq!(set.where_clause(), " WHERE equity > 0");
        assert!(set.params().is_empty());
        assert_eq!(set.param_count(), 0);
    }

    #[test]
    fn offset_shifts_numbering() {
        let mut set = PredicateSet::with_offset(2);
        set.and_gte("num_employees", 5_i32).and_lte("num_employees", 9_i32);

        assert_eq!(
            set.build_clause(),
            "num_employees >= $3 AND num_employees <= $4"
        );
        assert_eq!(set.param_count(), 4);
        assert_eq!(set.into_params().len(), 2);
    }
}
