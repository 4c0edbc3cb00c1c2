//! Table rendering for `--list-modes`

use scanner_core::catalog::ModeCatalog;

const HEADERS: [&str; 4] = ["NAME", "ENDPOINT", "TRIGGER", "PREFIXES"];

pub fn format_mode_table(catalog: &ModeCatalog) -> String {
    let rows: Vec<[String; 4]> = catalog
        .iter()
        .map(|mode| {
            [
                mode.name.clone(),
                mode.endpoint.to_string(),
                join_or_dash(&mode.exact_triggers),
                join_or_dash(&mode.prefix_triggers),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut table = String::new();
    push_row(&mut table, &HEADERS.map(String::from), &widths);
    for row in &rows {
        push_row(&mut table, row, &widths);
    }
    table
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

fn push_row(table: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    table.push_str(line.trim_end());
    table.push('\n');
}
