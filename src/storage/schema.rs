//! Schema definitions for the active URL table
//!
//! Table names cannot be bound as statement parameters, so every name that
//! reaches the SQL text below must pass [`validate_table_name`] first.

use crate::storage::traits::{StoreError, StoreResult};

/// Suffix of the table a replacement is built under before the swap
pub const STAGING_SUFFIX: &str = "_staging";

/// Longest identifier accepted (PostgreSQL's limit, minus the staging suffix)
const MAX_TABLE_NAME_LEN: usize = 63 - STAGING_SUFFIX.len();

/// Checks that `name` is a plain SQL identifier
pub fn validate_table_name(name: &str) -> StoreResult<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid_start && valid_rest && name.len() <= MAX_TABLE_NAME_LEN {
        Ok(())
    } else {
        Err(StoreError::InvalidTableName(name.to_string()))
    }
}

pub fn staging_table_name(table: &str) -> String {
    format!("{}{}", table, STAGING_SUFFIX)
}

/// `CREATE TABLE` for a single-column URL table
pub fn create_table_sql(table: &str) -> String {
    format!("CREATE TABLE {} (url TEXT UNIQUE NOT NULL)", table)
}

pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", table)
}

pub fn rename_table_sql(from: &str, to: &str) -> String {
    format!("ALTER TABLE {} RENAME TO {}", from, to)
}

pub fn count_rows_sql(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", table)
}

/// `INSERT` with `rows` single-value tuples, using `placeholder(n)` for the
/// n-th (1-based) parameter
pub fn insert_batch_sql(table: &str, rows: usize, placeholder: impl Fn(usize) -> String) -> String {
    let values: Vec<String> = (1..=rows).map(|n| format!("({})", placeholder(n))).collect();
    format!("INSERT INTO {} (url) VALUES {}", table, values.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_table_names() {
        assert!(validate_table_name("apt_active_ids").is_ok());
        assert!(validate_table_name("_t1").is_ok());
    }

    #[test]
    fn test_invalid_table_names() {
        for name in [
            "",
            "1table",
            "apt-active",
            "apt active",
            "t; DROP TABLE x",
            "\"quoted\"",
        ] {
            assert!(validate_table_name(name).is_err(), "{:?} accepted", name);
        }
        assert!(validate_table_name(&"t".repeat(60)).is_err());
    }

    #[test]
    fn test_ddl_text() {
        assert_eq!(
            create_table_sql("apt_active_ids"),
            "CREATE TABLE apt_active_ids (url TEXT UNIQUE NOT NULL)"
        );
        assert_eq!(staging_table_name("apt_active_ids"), "apt_active_ids_staging");
        assert_eq!(
            rename_table_sql("a_staging", "a"),
            "ALTER TABLE a_staging RENAME TO a"
        );
    }

    #[test]
    fn test_insert_batch_sql() {
        assert_eq!(
            insert_batch_sql("t", 3, |n| format!("${}", n)),
            "INSERT INTO t (url) VALUES ($1), ($2), ($3)"
        );
    }
}
