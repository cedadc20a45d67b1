//! Spreadsheet loader: one sheet, two regions. Columns A:D hold the expense
//! lines (located by header text), columns F:G hold the claim metadata as
//! key/value pairs.

use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use log::{info, warn};

use crate::config::Config;
use crate::error::Error;
use crate::receipts;
use crate::types::{format_price, Claim, ClaimMetadata, ExpenseLine};

/// Expected header texts of the expense-line block, row 1 of the sheet.
const COL_QUANTITY: &str = "Quantité";
const COL_REFERENCE: &str = "Référence";
const COL_UNIT_PRICE: &str = "Prix unitaire";
const COL_TOTAL_PRICE: &str = "Prix total";

/// Metadata block lives in fixed columns F (labels) and G (values).
const META_LABEL_COL: u32 = 5;
const META_VALUE_COL: u32 = 6;

/// Read the whole claim: metadata map, ordered expense lines, running total
/// and the receipt files. Any missing piece of the input (file, sheet,
/// header, receipts directory) is a fatal load error.
pub fn load_claim(config: &Config) -> Result<Claim, Error> {
    let mut workbook = open_workbook_auto(&config.data_file).map_err(|e| Error::Spreadsheet {
        path: config.data_file.clone(),
        source: e,
    })?;
    let range = workbook
        .worksheet_range(&config.sheet_name)
        .map_err(|_| Error::SheetNotFound(config.sheet_name.clone()))?;

    let metadata = read_metadata(&range);
    let (lines, total) = read_lines(&range)?;
    let receipts = receipts::list_receipts(&config.receipts_dir)?;

    info!(
        "loaded {} metadata field(s), {} expense line(s), {} receipt(s), total {}",
        metadata.len(),
        lines.len(),
        receipts.len(),
        format_price(total)
    );

    Ok(Claim {
        metadata,
        lines,
        total,
        receipts,
    })
}

/// Key/value pairs from columns F:G, skipping the header row. A row with an
/// empty label cell is ignored even if the value cell is filled; an empty
/// value cell becomes the empty string.
fn read_metadata(range: &Range<Data>) -> ClaimMetadata {
    let mut metadata = ClaimMetadata::new();
    let Some((end_row, _)) = range.end() else {
        return metadata;
    };
    for row in 1..=end_row {
        let Some(label) = range
            .get_value((row, META_LABEL_COL))
            .and_then(|cell| cell.as_string())
        else {
            continue;
        };
        if label.trim().is_empty() {
            continue;
        }
        let value = range
            .get_value((row, META_VALUE_COL))
            .and_then(|cell| cell.as_string())
            .unwrap_or_default();
        metadata.insert(&label, value);
    }
    metadata
}

/// Expense lines in sheet order. A row counts iff its reference cell is
/// non-blank; quantity and both prices independently default to 0. The total
/// accumulates the raw (unrounded) line totals.
fn read_lines(range: &Range<Data>) -> Result<(Vec<ExpenseLine>, f64), Error> {
    let quantity_col = find_column(range, COL_QUANTITY)?;
    let reference_col = find_column(range, COL_REFERENCE)?;
    let unit_price_col = find_column(range, COL_UNIT_PRICE)?;
    let total_price_col = find_column(range, COL_TOTAL_PRICE)?;

    let mut lines = Vec::new();
    let mut total = 0.0f64;
    let Some((end_row, _)) = range.end() else {
        return Ok((lines, total));
    };

    for row in 1..=end_row {
        let reference = range
            .get_value((row, reference_col))
            .and_then(|cell| cell.as_string())
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if reference.is_empty() {
            // Dropped by contract, but flag it: a half-filled row is usually
            // a data-entry mistake in the workbook, not an intentional blank.
            let populated = [quantity_col, unit_price_col, total_price_col]
                .iter()
                .any(|&col| {
                    range
                        .get_value((row, col))
                        .map(|cell| !cell.is_empty())
                        .unwrap_or(false)
                });
            if populated {
                warn!(
                    "row {}: skipping expense line with an empty reference but populated cells",
                    row + 1
                );
            }
            continue;
        }

        let quantity = cell_i64(range, row, quantity_col);
        let unit_price = cell_f64(range, row, unit_price_col);
        let total_price = cell_f64(range, row, total_price_col);
        total += total_price;

        lines.push(ExpenseLine {
            quantity,
            reference,
            unit_price: format_price(unit_price),
            total_price: format_price(total_price),
        });
    }

    Ok((lines, total))
}

/// Locate a column by its exact header text in row 1.
fn find_column(range: &Range<Data>, header: &'static str) -> Result<u32, Error> {
    let Some((_, end_col)) = range.end() else {
        return Err(Error::MissingColumn(header));
    };
    for col in 0..=end_col {
        let text = range
            .get_value((0, col))
            .and_then(|cell| cell.as_string())
            .unwrap_or_default();
        if text.trim() == header {
            return Ok(col);
        }
    }
    Err(Error::MissingColumn(header))
}

fn cell_i64(range: &Range<Data>, row: u32, col: u32) -> i64 {
    range
        .get_value((row, col))
        .and_then(|cell| cell.as_i64().or_else(|| cell.as_f64().map(|f| f as i64)))
        .unwrap_or(0)
}

fn cell_f64(range: &Range<Data>, row: u32, col: u32) -> f64 {
    range
        .get_value((row, col))
        .and_then(|cell| cell.as_f64())
        .unwrap_or(0.0)
}
