use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use nom024_catalog::{CatalogStats, LoadOutcome, LoadReport};

/// Per-catalog load status, mandatory catalogs first.
pub fn catalog_table(stats: &CatalogStats, report: &LoadReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Catalog"),
        header_cell("Kind"),
        header_cell("Status"),
        header_cell("Entries"),
        header_cell("Skipped"),
        header_cell("Duplicates"),
    ]);
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    for index in 3..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut ordered: Vec<_> = stats.catalogs.iter().collect();
    ordered.sort_by_key(|status| status.optional);
    for status in ordered {
        let kind = if status.optional {
            dim_cell("optional")
        } else {
            Cell::new("mandatory")
        };
        let (status_cell, skipped, duplicates) = match report.outcome(status.catalog) {
            Some(LoadOutcome::Loaded {
                skipped_rows,
                duplicates,
                ..
            }) if status.loaded => (
                Cell::new("loaded").fg(Color::Green),
                count_cell(Some(*skipped_rows), Color::Yellow),
                count_cell(Some(*duplicates), Color::Yellow),
            ),
            Some(LoadOutcome::Failed { message }) => (
                failure_cell(status.optional, format!("failed: {message}")),
                count_cell(None, Color::Yellow),
                count_cell(None, Color::Yellow),
            ),
            Some(LoadOutcome::NotConfigured) | None if !status.loaded => (
                failure_cell(status.optional, "not configured".to_string()),
                count_cell(None, Color::Yellow),
                count_cell(None, Color::Yellow),
            ),
            _ => (
                Cell::new(if status.loaded { "loaded" } else { "empty" }),
                count_cell(None, Color::Yellow),
                count_cell(None, Color::Yellow),
            ),
        };
        table.add_row(vec![
            Cell::new(status.catalog.dataset_name()).add_attribute(Attribute::Bold),
            kind,
            status_cell,
            Cell::new(status.entries),
            skipped,
            duplicates,
        ]);
    }
    table
}

/// One-line totals, e.g. `9/9 mandatory, 2/4 optional`.
pub fn totals_line(stats: &CatalogStats) -> String {
    format!(
        "{}/{} mandatory, {}/{} optional",
        stats.mandatory_loaded, stats.mandatory_total, stats.optional_loaded, stats.optional_total
    )
}

pub fn print_catalog_summary(stats: &CatalogStats, report: &LoadReport) {
    println!("{}", catalog_table(stats, report));
    println!("{}", totals_line(stats));
    let failed = report.failed_mandatory();
    if !failed.is_empty() {
        eprintln!("Mandatory catalogs unavailable:");
        for catalog in failed {
            eprintln!("- {catalog}");
        }
    }
}

fn failure_cell(optional: bool, label: String) -> Cell {
    if optional {
        Cell::new(label).fg(Color::Yellow)
    } else {
        Cell::new(label).fg(Color::Red).add_attribute(Attribute::Bold)
    }
}

fn count_cell(count: Option<usize>, color: Color) -> Cell {
    match count {
        Some(value) if value > 0 => Cell::new(value).fg(color).add_attribute(Attribute::Bold),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
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

#[cfg(test)]
mod tests {
    use super::*;
    use nom024_catalog::CatalogCache;
    use nom024_model::{CatalogEntry, CatalogType};

    #[test]
    fn table_lists_every_catalog() {
        let cache = CatalogCache::new();
        cache
            .inject(
                CatalogType::Procedures,
                vec![CatalogEntry::plain("8901", "CONSULTA GENERAL")],
            )
            .unwrap();
        let stats = cache.stats();
        let table = catalog_table(&stats, &LoadReport::default());
        assert_eq!(table.row_iter().count(), CatalogType::all().len());
        insta::assert_snapshot!(totals_line(&stats), @"0/9 mandatory, 1/4 optional");
    }
}
