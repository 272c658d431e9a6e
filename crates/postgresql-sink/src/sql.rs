//! SQL text for the PostgreSQL sink.

/// Destination columns, in record field order.
pub const COLUMNS: [&str; 5] = [
    "date",
    "latin_text",
    "local_text",
    "even_value",
    "decimal_value",
];

/// PostgreSQL accepts at most 65535 bind parameters per statement.
pub const MAX_ROWS_PER_STATEMENT: usize = u16::MAX as usize / COLUMNS.len();

/// Quote a possibly schema-qualified identifier (`schema.name`).
pub fn quote_identifier(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// Multi-row INSERT for `rows` records with positional parameters.
pub fn build_insert_sql(table: &str, rows: usize) -> String {
    let col_count = COLUMNS.len();
    let mut param_idx = 1;
    let mut placeholders: Vec<String> = Vec::with_capacity(rows);

    for _ in 0..rows {
        let row_placeholders: Vec<String> = (0..col_count)
            .map(|_| {
                let p = format!("${param_idx}");
                param_idx += 1;
                p
            })
            .collect();
        placeholders.push(format!("({})", row_placeholders.join(", ")));
    }

    format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote_identifier(table),
        COLUMNS
            .iter()
            .map(|c| format!("\"{c}\""))
            .collect::<Vec<_>>()
            .join(", "),
        placeholders.join(", ")
    )
}

/// Statement calling a set-returning function.
pub fn build_query_procedure_sql(name: &str) -> String {
    format!("SELECT * FROM {}()", quote_identifier(name))
}

/// Statement calling a procedure without a result set.
pub fn build_void_procedure_sql(name: &str) -> String {
    format!("CALL {}()", quote_identifier(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("imported_data"), "\"imported_data\"");
        assert_eq!(
            quote_identifier("public.imported_data"),
            "\"public\".\"imported_data\""
        );
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_build_insert_sql() {
        let sql = build_insert_sql("imported_data", 2);
        assert_eq!(
            sql,
            "INSERT INTO \"imported_data\" (\"date\", \"latin_text\", \"local_text\", \
             \"even_value\", \"decimal_value\") VALUES ($1, $2, $3, $4, $5), \
             ($6, $7, $8, $9, $10)"
        );
    }

    #[test]
    fn test_max_rows_fit_parameter_limit() {
        assert!(MAX_ROWS_PER_STATEMENT * COLUMNS.len() <= u16::MAX as usize);
        assert!(MAX_ROWS_PER_STATEMENT >= 1000);
    }

    #[test]
    fn test_procedure_sql() {
        assert_eq!(
            build_query_procedure_sql("row_stats"),
            "SELECT * FROM \"row_stats\"()"
        );
        assert_eq!(
            build_void_procedure_sql("public.truncate_rows"),
            "CALL \"public\".\"truncate_rows\"()"
        );
    }
}
