use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};

use crate::comparison::TableModel;
use crate::mappings::CellStatus;

const SHEET_NAME_MAX: usize = 31;

/// Dated output name, e.g. `biosimilar_markets_19.10.2026.xlsx`
pub fn dated_filename(prefix: &str, extension: &str) -> String {
    let now = Local::now();
    format!("{}_{}.{}", prefix, now.format("%d.%m.%Y"), extension)
}

/// Write one worksheet per market table.
pub fn write_workbook(tables: &[TableModel], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let centered = Format::new().set_align(FormatAlign::Center);
    let mut used_names = HashSet::new();

    for model in tables {
        let sheet_name = sheet_name(&model.market, &mut used_names);
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet_name)
            .with_context(|| format!("Invalid sheet name '{}'", sheet_name))?;

        worksheet.write_string_with_format(0, 0, "Product", &bold)?;
        worksheet.write_string_with_format(0, 1, "Applicant", &bold)?;
        for (i, header) in model.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, column(i + 2)?, header, &bold)?;
        }

        for (r, row) in model.rows.iter().enumerate() {
            let excel_row = u32::try_from(r + 1).context("Too many rows for a worksheet")?;
            if row.is_reference {
                worksheet.write_string_with_format(excel_row, 0, &row.proprietary_name, &bold)?;
            } else {
                worksheet.write_string(excel_row, 0, &row.proprietary_name)?;
            }
            worksheet.write_string(excel_row, 1, &row.applicant_name)?;
            for (i, header) in model.headers.iter().enumerate() {
                let status = row.status(header);
                if status.is_empty() {
                    continue;
                }
                let format = centered.clone().set_background_color(status_fill(status));
                worksheet.write_string_with_format(excel_row, column(i + 2)?, status.code(), &format)?;
            }
        }
        worksheet.set_freeze_panes(1, 2)?;
        worksheet.set_column_width(0, 24)?;
        worksheet.set_column_width(1, 28)?;
    }

    if tables.is_empty() {
        workbook.add_worksheet().write_string(0, 0, "No markets")?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), sheets = tables.len(), "wrote workbook");
    Ok(())
}

fn column(index: usize) -> Result<u16> {
    u16::try_from(index).context("Too many presentation columns for a worksheet")
}

fn status_fill(status: CellStatus) -> Color {
    match status {
        CellStatus::Reference => Color::RGB(0xCFE2F3),
        CellStatus::Biosimilar => Color::RGB(0xD9EAD3),
        CellStatus::Interchangeable => Color::RGB(0xD0E0E3),
        CellStatus::Discontinued => Color::RGB(0xF4CCCC),
        CellStatus::Empty => Color::White,
    }
}

/// Excel sheet names: max 31 chars, none of `[]:*?/\`, unique per workbook.
pub fn sheet_name(market: &str, used: &mut HashSet<String>) -> String {
    let cleaned: String = market
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim();
    let base: String = if cleaned.is_empty() {
        "Market".to_string()
    } else {
        cleaned.chars().take(SHEET_NAME_MAX).collect()
    };

    let mut candidate = base.clone();
    let mut n = 2;
    while !used.insert(candidate.to_lowercase()) {
        let suffix = format!(" ({})", n);
        let keep = SHEET_NAME_MAX - suffix.chars().count();
        candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
        n += 1;
    }
    candidate
}
