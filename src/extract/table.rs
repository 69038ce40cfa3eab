//! Capability table decoding
//!
//! # Table Structure
//!
//! - First column is the model name, usually wrapped in `<code>`
//! - Remaining header cells name the capability columns
//! - A cell containing an `<svg>` (checkmark icon) means supported

use crate::snapshot::ModelCapability;
use scraper::ElementRef;
use std::collections::BTreeMap;

/// Columns and model rows decoded from one table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableData {
    /// Capability column names, in visual order
    pub columns: Vec<String>,

    /// One entry per usable body row, in row order
    pub models: Vec<ModelCapability>,
}

impl TableData {
    /// True if the table produced no model rows
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Decodes a located capability table
///
/// Only the table's own sections are read; cells of nested tables are never
/// mixed in. Rows come from `<tbody>` sections alone, so a table whose rows
/// all sit in `<thead>` yields zero models. Every body row with a data cell
/// and a non-empty first cell is a model row, including a first row that
/// also supplied the header.
pub fn parse_capabilities_table(table: ElementRef<'_>) -> TableData {
    let columns = parse_columns(table);

    let mut models = Vec::new();
    for section in child_elements(table, &["tbody"]) {
        for row in child_elements(section, &["tr"]) {
            if let Some(model) = parse_row(row, &columns) {
                models.push(model);
            }
        }
    }

    TableData { columns, models }
}

/// Reads the capability column names
///
/// `<thead>` header cells win. Without them the first row of the table is
/// used, whatever its cell type. The first cell (the model column) is always
/// skipped, and empty header cells are dropped.
fn parse_columns(table: ElementRef<'_>) -> Vec<String> {
    if let Some(row) = child_elements(table, &["thead"])
        .into_iter()
        .find_map(|thead| child_elements(thead, &["tr"]).into_iter().next())
    {
        let columns = header_texts(&child_elements(row, &["th"]));
        if !columns.is_empty() {
            return columns;
        }
    }

    table_rows(table)
        .into_iter()
        .next()
        .map(|row| header_texts(&child_elements(row, &["td", "th"])))
        .unwrap_or_default()
}

fn header_texts(cells: &[ElementRef<'_>]) -> Vec<String> {
    cells
        .iter()
        .skip(1)
        .map(|cell| cell_text(*cell))
        .filter(|text| !text.is_empty())
        .collect()
}

fn parse_row(row: ElementRef<'_>, columns: &[String]) -> Option<ModelCapability> {
    let cells = child_elements(row, &["td"]);
    let (first, rest) = cells.split_first()?;

    let model = model_name(*first);
    if model.is_empty() {
        return None;
    }

    // Extra cells beyond the known columns are ignored
    let capabilities: BTreeMap<String, bool> = rest
        .iter()
        .zip(columns)
        .map(|(cell, column)| (column.clone(), contains_icon(*cell)))
        .collect();

    Some(ModelCapability {
        model,
        capabilities,
    })
}

/// Text of any `<code>` inside the cell, else the cell's own text
fn model_name(cell: ElementRef<'_>) -> String {
    let code_text: String = cell
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "code")
        .flat_map(|el| el.text())
        .collect();

    let code_text = code_text.trim();
    if code_text.is_empty() {
        cell_text(cell)
    } else {
        code_text.to_string()
    }
}

fn contains_icon(cell: ElementRef<'_>) -> bool {
    cell.descendants()
        .filter_map(ElementRef::wrap)
        .any(|el| el.value().name() == "svg")
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// All rows belonging to `table`, in document order
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(child_elements(child, &["tr"])),
            _ => {}
        }
    }
    rows
}

fn child_elements<'a>(parent: ElementRef<'a>, names: &[&str]) -> Vec<ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| names.contains(&el.value().name()))
        .collect()
}
