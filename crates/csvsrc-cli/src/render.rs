//! Terminal rendering for catalogs, schemas and rows.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::ser::{Serialize, SerializeMap, Serializer};

use csvsrc_ingest::Catalog;
use csvsrc_model::{Row, TableDescriptor};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

/// One line per discovered table.
pub fn catalog_table(catalog: &Catalog) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Columns"),
        header_cell("Header"),
        header_cell("Encoding"),
        header_cell("Path"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Center);
    for descriptor in catalog.tables().values() {
        table.add_row(vec![
            Cell::new(&descriptor.name).add_attribute(Attribute::Bold),
            Cell::new(descriptor.columns.len()),
            Cell::new(if descriptor.header_row { "yes" } else { "no" }),
            Cell::new(descriptor.encoding),
            Cell::new(descriptor.path.display()),
        ]);
    }
    table
}

/// Column listing for one table.
pub fn columns_table(descriptor: &TableDescriptor) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for column in &descriptor.columns {
        table.add_row(vec![
            Cell::new(column.index),
            Cell::new(&column.name),
            Cell::new(column.column_type),
            Cell::new(&column.description),
        ]);
    }
    table
}

/// Rows laid out under the table's declared columns; absent values render empty.
pub fn rows_table(descriptor: &TableDescriptor, rows: &[Row]) -> Table {
    let mut table = Table::new();
    table.set_header(
        descriptor
            .columns
            .iter()
            .map(|c| header_cell(&c.name))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for row in rows {
        table.add_row(
            descriptor
                .columns
                .iter()
                .map(|c| Cell::new(row.field(&c.accessor).unwrap_or_default()))
                .collect::<Vec<_>>(),
        );
    }
    table
}

/// A row serialized with keys in the table's column order.
struct OrderedRow<'a> {
    descriptor: &'a TableDescriptor,
    row: &'a Row,
}

impl Serialize for OrderedRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for column in &self.descriptor.columns {
            if let Some(value) = self.row.field(&column.accessor) {
                map.serialize_entry(&column.name, value)?;
            }
        }
        map.end()
    }
}

/// One JSON object per row, keys in column order; absent columns are omitted.
pub fn row_json(descriptor: &TableDescriptor, row: &Row) -> serde_json::Result<String> {
    serde_json::to_string(&OrderedRow { descriptor, row })
}
