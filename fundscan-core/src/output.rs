//! Output writers: the flat observation file and the two matrix tables.
//!
//! Everything is written `;`-delimited with invariant dot decimals, matching
//! how the inputs are parsed, so files written here can be read back with the
//! same conventions.

use crate::domain::Observation;
use crate::error::FilterError;
use crate::matrix::QuoteMatrix;
use std::path::Path;

/// Write the flat observation file: one row per observation, in scan order.
pub fn write_flat(path: &Path, observations: &[Observation]) -> Result<(), FilterError> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
    for obs in observations {
        writer.serialize(obs)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the quota-level and day-over-day tables for a populated matrix.
///
/// Both tables share the header `Date;<id>;...` with identifiers in column
/// order, and are row-synchronized: one row per calendar date whose presence
/// flag is set. Dates with no data anywhere are omitted entirely, not
/// emitted as blank rows.
///
/// In the vardia table each cell is `current/previous - 1` against that
/// column's most recently written value on any prior emitted row. The cell
/// is blank when the current quota cell is blank or when the column has no
/// prior written value; there is no carry-forward beyond "last written
/// value". The blank rule is also what keeps the division away from absent
/// previous values.
pub fn write_matrix(
    cotas_path: &Path,
    vardia_path: &Path,
    matrix: &QuoteMatrix,
) -> Result<(), FilterError> {
    let mut cotas = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(cotas_path)?;
    let mut vardia = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(vardia_path)?;

    let mut header: Vec<String> = vec!["Date".into()];
    header.extend(matrix.columns().iter().cloned());
    cotas.write_record(&header)?;
    vardia.write_record(&header)?;

    // Last written quota per column, feeding the day-over-day change.
    let mut previous: Vec<Option<f64>> = vec![None; matrix.columns().len()];

    for row in 0..matrix.row_count() {
        if !matrix.row_has_data(row) {
            continue;
        }
        let date = matrix.date_at(row).to_string();
        let mut cotas_row: Vec<String> = Vec::with_capacity(header.len());
        let mut vardia_row: Vec<String> = Vec::with_capacity(header.len());
        cotas_row.push(date.clone());
        vardia_row.push(date);

        for col in 0..matrix.columns().len() {
            let value = matrix.value(row, col);
            if value.is_nan() {
                cotas_row.push(String::new());
                vardia_row.push(String::new());
                continue;
            }
            cotas_row.push(value.to_string());
            vardia_row.push(match previous[col] {
                Some(prev) => format!("{:.8}", value / prev - 1.0),
                None => String::new(),
            });
            previous[col] = Some(value);
        }

        cotas.write_record(&cotas_row)?;
        vardia.write_record(&vardia_row)?;
    }

    cotas.flush()?;
    vardia.flush()?;
    Ok(())
}
