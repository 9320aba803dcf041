//! SQL identifier quoting.
//!
//! Column names in generated SET clauses are always emitted in quoted form so
//! that mixed-case logical names (e.g. `firstName`) survive as-is.
//!
//! - Quoted identifiers allow any characters except NUL
//! - An embedded `"` is escaped as `""`
//!
//! # Example
//! ```ignore
//! use jobly::Ident;
//!
//! let c = Ident::quoted("company_handle")?;
//! assert_eq!(c.to_sql(), r#""company_handle""#);
//! # Ok::<(), jobly::JoblyError>(())
//! ```

use crate::error::{JoblyError, JoblyResult};

/// A single quoted SQL identifier (column or table name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    name: String,
}

impl Ident {
    /// Create a quoted identifier.
    pub fn quoted(name: &str) -> JoblyResult<Self> {
        if name.is_empty() {
            return Err(JoblyError::validation("Empty quoted identifier"));
        }
        if name.contains('\0') {
            return Err(JoblyError::validation(
                "Identifier cannot contain NUL character",
            ));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// The raw (unquoted) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::with_capacity(self.name.len() + 2);
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        out.push('"');
        for ch in self.name.chars() {
            if ch == '"' {
                out.push('"');
                out.push('"');
            } else {
                out.push(ch);
            }
        }
        out.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        let ident = Ident::quoted("title").unwrap();
        assert_eq!(ident.to_sql(), r#""title""#);
        assert_eq!(ident.name(), "title");
    }

    #[test]
    fn ident_keeps_case() {
        let ident = Ident::quoted("firstName").unwrap();
        assert_eq!(ident.to_sql(), r#""firstName""#);
    }

    #[test]
    fn ident_quoted_with_escape() {
        let ident = Ident::quoted(r#"has"quote"#).unwrap();
        assert_eq!(ident.to_sql(), r#""has""quote""#);
    }

    #[test]
    fn ident_rejects_empty() {
        assert!(Ident::quoted("").is_err());
    }

    #[test]
    fn ident_rejects_nul() {
        assert!(Ident::quoted("a\0b").is_err());
    }
}
