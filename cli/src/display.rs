//! Plain-text rendering of tables for the terminal

use comfy_table::{ColumnConstraint, ContentArrangement, Table, Width};

use labreport_core::RawTable;

/// Widest a column may grow before its cells wrap
const MAX_CELL_WIDTH: u16 = 32;

/// Build a terminal table from `headers` and `rows`
pub fn grid(headers: &[String], rows: &[Vec<String>]) -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    for row in rows {
        table.add_row(row);
    }

    let columns = table.column_count();
    table.set_constraints(vec![ColumnConstraint::UpperBoundary(Width::Fixed(MAX_CELL_WIDTH)); columns]);
    table
}

/// Render `headers` and `rows` as an aligned text grid
pub fn render_grid(headers: &[String], rows: &[Vec<String>]) -> String {
    grid(headers, rows).to_string()
}

/// Render a raw table under a `name (N rows)` caption
pub fn render_table(table: &RawTable) -> String {
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|v| v.to_cell_text()).collect())
        .collect();
    format!(
        "{} ({} rows)\n{}",
        table.name,
        table.len(),
        render_grid(&table.columns, &rows)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use labreport_core::Value;

    #[test]
    fn test_grid_contents() {
        let rows = vec![vec!["1".to_string(), "PE100".to_string()], vec!["12".to_string(), "X".to_string()]];
        let mut table = grid(&["Id".to_string(), "Sample".to_string()], &rows);
        assert_eq!(table.column_count(), 2);

        let text = table.to_string();
        let header = text.lines().find(|l| l.contains("Id")).unwrap();
        assert!(header.contains("Sample"));
        assert!(text.lines().any(|l| l.contains("12") && l.contains('X')));
        assert!(text.lines().any(|l| l.contains("PE100")));
    }

    #[test]
    fn test_long_cells_wrap() {
        let long = "x".repeat(80);
        let text = render_grid(&["A".to_string()], &[vec![long.clone()]]);
        assert!(!text.contains(&long));
        assert_eq!(text.matches('x').count(), 80);
    }

    #[test]
    fn test_render_table() {
        let table = RawTable::new(
            "Test Ana",
            vec!["Test Id".into()],
            vec![vec![Value::Integer(7)], vec![Value::Null]],
        );
        let text = render_table(&table);
        assert!(text.starts_with("Test Ana (2 rows)\n"));
        assert!(text.contains('7'));
        assert!(text.contains('-'));
    }
}
