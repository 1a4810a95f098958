//! Input table parsing and enriched-table output
//!
//! The input is arbitrary delimited text; the caller designates which two
//! columns hold the listing URL and the VIN (the library never guesses, see
//! [`crate::config::ColumnSpec`]). The enriched output keeps the input
//! schema byte-for-byte and appends one resolved-URL column.

use std::collections::HashMap;

use crate::config::ColumnSpec;
use crate::error::{InputError, Result};
use crate::types::InputRecord;

/// A parsed input table with the two designated columns located
#[derive(Clone, Debug)]
pub struct InputTable {
    headers: csv::StringRecord,
    rows: Vec<csv::StringRecord>,
    listing_idx: usize,
    vin_idx: usize,
}

impl InputTable {
    /// Parse delimited input bytes and locate the designated columns
    ///
    /// Ragged rows are tolerated; missing cells read as empty. An empty
    /// table or a missing designated column halts the run here, before any
    /// record is processed.
    ///
    /// # Errors
    ///
    /// [`InputError::Parse`] for undecodable input, [`InputError::MissingColumn`]
    /// when a designated column is absent, [`InputError::EmptyTable`] when
    /// there are no data rows.
    pub fn parse(input: &[u8], columns: &ColumnSpec) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);

        let headers = reader
            .headers()
            .map_err(|e| InputError::Parse(e.to_string()))?
            .clone();

        let listing_idx = headers
            .iter()
            .position(|h| h == columns.listing_url)
            .ok_or_else(|| InputError::MissingColumn {
                role: "listing URL",
                name: columns.listing_url.clone(),
            })?;
        let vin_idx = headers
            .iter()
            .position(|h| h == columns.vin)
            .ok_or_else(|| InputError::MissingColumn {
                role: "VIN",
                name: columns.vin.clone(),
            })?;

        let rows = reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| InputError::Parse(e.to_string()))?;

        if rows.is_empty() {
            return Err(InputError::EmptyTable.into());
        }

        Ok(Self {
            headers,
            rows,
            listing_idx,
            vin_idx,
        })
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows (never true after `parse`)
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The designated cells of every row, in input order
    pub fn records(&self) -> Vec<InputRecord> {
        self.rows
            .iter()
            .enumerate()
            .map(|(row, record)| InputRecord {
                row,
                vin: vin_for(record.get(self.vin_idx), row),
                listing_url_raw: record.get(self.listing_idx).unwrap_or("").to_string(),
            })
            .collect()
    }

    /// Render the enriched table: input schema plus one appended column
    ///
    /// Each row's appended cell comes from the lookup under the row's VIN
    /// (with the same `row_<n>` fallback used during processing); rows
    /// without a resolution get an empty cell.
    pub fn enriched_csv(
        &self,
        resolved_header: &str,
        lookup: &HashMap<String, Option<String>>,
    ) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header_row: Vec<&str> = self.headers.iter().collect();
        header_row.push(resolved_header);
        writer.write_record(&header_row)?;

        for (row, record) in self.rows.iter().enumerate() {
            let vin = vin_for(record.get(self.vin_idx), row);
            let resolved = lookup
                .get(&vin)
                .and_then(|url| url.as_deref())
                .unwrap_or("");

            let mut cells: Vec<&str> = (0..self.headers.len())
                .map(|idx| record.get(idx).unwrap_or(""))
                .collect();
            cells.push(resolved);
            writer.write_record(&cells)?;
        }

        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()).into())
    }
}

/// The VIN cell of a row, falling back to `row_<n>` when empty or missing
fn vin_for(cell: Option<&str>, row: usize) -> String {
    match cell.map(str::trim) {
        Some(vin) if !vin.is_empty() => vin.to_string(),
        _ => format!("row_{row}"),
    }
}
