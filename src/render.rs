use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::comparison::{Row, TableModel};
use crate::mappings::CellStatus;

pub fn comparison_table(model: &TableModel) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![header_cell("Product"), header_cell("Applicant")];
    header.extend(model.headers.iter().map(|h| header_cell(h)));
    table.set_header(header);

    for row in &model.rows {
        table.add_row(row_cells(row, &model.headers));
    }
    table
}

fn row_cells(row: &Row, headers: &[String]) -> Vec<Cell> {
    let mut name = Cell::new(&row.proprietary_name);
    if row.is_reference {
        name = name.add_attribute(Attribute::Bold);
    }
    let mut cells = vec![name, Cell::new(&row.applicant_name)];
    cells.extend(headers.iter().map(|h| status_cell(row.status(h))));
    cells
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn status_cell(status: CellStatus) -> Cell {
    let cell = Cell::new(status.code()).set_alignment(CellAlignment::Center);
    match status_color(status) {
        Some(color) => cell.fg(color),
        None => cell,
    }
}

fn status_color(status: CellStatus) -> Option<Color> {
    match status {
        CellStatus::Reference => Some(Color::Blue),
        CellStatus::Biosimilar => Some(Color::Green),
        CellStatus::Interchangeable => Some(Color::Cyan),
        CellStatus::Discontinued => Some(Color::Red),
        CellStatus::Empty => None,
    }
}

/// "R = Reference Product, B = Biosimilar, ..."
pub fn legend() -> String {
    CellStatus::LEGEND
        .iter()
        .map(|s| format!("{} = {}", s.code(), s.description()))
        .collect::<Vec<_>>()
        .join(", ")
}
