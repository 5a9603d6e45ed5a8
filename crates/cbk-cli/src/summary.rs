use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use cbk_cli::pipeline::RunOutcome;
use cbk_model::Schema;

/// Print the run summary. Goes to stderr when records went to stdout.
pub fn print_summary(outcome: &RunOutcome) {
    let mut lines = Vec::new();
    if let Some(path) = &outcome.output {
        lines.push(format!("Records: {}", path.display()));
    }
    if let Some(path) = &outcome.errors {
        lines.push(format!("Error report: {}", path.display()));
    }

    let summary = &outcome.summary;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Outcome"), header_cell("Lines")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Lines read"), Cell::new(summary.lines_read)]);
    table.add_row(vec![dim_cell("Blank lines"), dim_cell(summary.blank_lines)]);
    table.add_row(vec![
        Cell::new("Records").fg(Color::Green),
        count_cell(summary.records, Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Decode errors"),
        count_cell(summary.decode_errors, Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("Validation errors"),
        count_cell(summary.validation_errors, Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("Unexpected errors"),
        count_cell(summary.unexpected_errors, Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("Warnings"),
        count_cell(summary.warnings, Color::Yellow),
    ]);
    lines.push(table.to_string());
    if summary.truncated {
        lines.push("Stopped early: error limit reached.".to_string());
    }

    let text = lines.join("\n");
    if outcome.output.is_some() {
        println!("{text}");
    } else {
        eprintln!("{text}");
    }
}

/// Print the fields of a layout, then any overlapping ranges.
pub fn print_layout(schema: &Schema) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Type"),
        header_cell("Start"),
        header_cell("Length"),
        header_cell("End"),
        header_cell("Scale"),
    ]);
    apply_table_style(&mut table);
    for index in 2..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for field in schema {
        let scale = if field.kind.is_numeric() && field.scale > 0 {
            Cell::new(field.scale)
        } else {
            dim_cell("-")
        };
        table.add_row(vec![
            Cell::new(&field.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(field.kind.as_str()),
            Cell::new(field.start),
            Cell::new(field.length),
            Cell::new(field.end()),
            scale,
        ]);
    }
    println!("{table}");
    println!("Record length: {} characters", schema.required_length());

    let overlaps = schema.overlaps();
    if !overlaps.is_empty() {
        eprintln!("Overlapping fields:");
        for overlap in overlaps {
            eprintln!(
                "- {} and {} share characters {}..{}",
                overlap.first, overlap.second, overlap.start, overlap.end
            );
        }
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(60);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
