//! Markdown table rendering for the source listing.

use console::measure_text_width;
use nugetsrc_config::SourceRow;

const HEADERS: [&str; 3] = ["Name", "Source", "Protocol Version"];

/// Render sources as a Markdown table followed by a row count
pub fn render_sources(rows: &[SourceRow]) -> String {
    let cells: Vec<[&str; 3]> = rows
        .iter()
        .map(|row| {
            [
                row.name.as_str(),
                row.source.as_str(),
                row.protocol_version.as_deref().unwrap_or(""),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(measure_text_width);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(measure_text_width(cell));
        }
    }

    let mut table = String::new();
    push_row(&mut table, &HEADERS, &widths);

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    table.push('|');
    table.push_str(&separator.join("|"));
    table.push_str("|\n");

    for row in &cells {
        push_row(&mut table, row, &widths);
    }

    table.push_str(&format!("\nCount: {}\n", rows.len()));
    table
}

fn push_row(table: &mut String, cells: &[&str; 3], widths: &[usize; 3]) {
    table.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        let padding = width - measure_text_width(cell);
        table.push_str(&format!(" {}{} |", cell, " ".repeat(padding)));
    }
    table.push('\n');
}
