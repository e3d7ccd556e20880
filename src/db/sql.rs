//! SQL text builders.
//!
//! Identifiers cannot be bound as parameters, so they are quoted here with the
//! engine's escape rule. Values never appear in generated SQL; every statement
//! built in this module uses placeholders.

/// Quote a SQLite identifier (`"name"`, embedded quotes doubled).
pub fn quote_sqlite_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a MySQL identifier (`` `name` ``, embedded backticks doubled).
pub fn quote_mysql_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// `SELECT COUNT(*)` for a source table.
pub fn sqlite_count(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_sqlite_ident(table))
}

/// Paginated read of a source table. Binds: limit, offset.
pub fn sqlite_page(table: &str, columns: &[&str]) -> String {
    let cols = columns
        .iter()
        .map(|c| quote_sqlite_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT {} FROM {} LIMIT ? OFFSET ?",
        cols,
        quote_sqlite_ident(table)
    )
}

/// Single-row insert into a destination table. Binds: one value per column.
pub fn mysql_insert(table: &str, columns: &[&str]) -> String {
    let cols = columns
        .iter()
        .map(|c| quote_mysql_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_mysql_ident(table),
        cols,
        placeholders
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_sqlite_ident() {
        assert_eq!(quote_sqlite_ident("accounts"), "\"accounts\"");
        assert_eq!(quote_sqlite_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_quote_mysql_ident() {
        assert_eq!(quote_mysql_ident("accounts"), "`accounts`");
        assert_eq!(quote_mysql_ident("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_sqlite_page() {
        assert_eq!(
            sqlite_page("accounts", &["id", "email"]),
            "SELECT \"id\", \"email\" FROM \"accounts\" LIMIT ? OFFSET ?"
        );
    }

    #[test]
    fn test_mysql_insert() {
        assert_eq!(
            mysql_insert("accounts", &["id", "email", "created_at"]),
            "INSERT INTO `accounts` (`id`, `email`, `created_at`) VALUES (?, ?, ?)"
        );
    }

    #[test]
    fn test_injection_in_names_stays_quoted() {
        let sql = mysql_insert("t`; DROP TABLE x; --", &["a"]);
        assert!(sql.starts_with("INSERT INTO `t``; DROP TABLE x; --` "));
    }
}
