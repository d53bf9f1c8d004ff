use serde::Serialize;
use std::error::Error;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

const BAR_GLYPH: char = '█';

pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{}\n", s);
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Render a header plus string records as a markdown table.
pub fn render_grid(header: &[String], records: &[Vec<String>]) -> String {
    let mut builder = Builder::default();
    builder.push_record(header.iter().cloned());
    for record in records {
        builder.push_record(record.iter().cloned());
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn print_grid(header: &[String], records: &[Vec<String>]) {
    if records.is_empty() {
        println!("(no rows)\n");
        return;
    }
    println!("{}\n", render_grid(header, records));
}

/// A horizontal bar scaled so `max` fills `width` glyphs. Non-zero values
/// always get at least one glyph.
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if width == 0 || !value.is_finite() || value <= 0.0 || !max.is_finite() || max <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * width as f64).round() as usize;
    std::iter::repeat(BAR_GLYPH)
        .take(len.clamp(1, width))
        .collect()
}

pub fn print_title(title: &str) {
    println!("\n{}", title);
    println!("{}\n", "=".repeat(title.chars().count()));
}
