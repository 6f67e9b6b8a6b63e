//! Delimited-text encoding of batches and published state

use crate::domain::{ConsolidatorError, MaterializedState, Record, Result, TableSchema};

/// Delimited-text dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// Field delimiter byte
    pub delimiter: u8,

    /// Whether the first row is a header
    pub has_header: bool,
}

impl Dialect {
    /// Comma-separated with or without a header row
    pub fn comma(has_header: bool) -> Self {
        Self {
            delimiter: b',',
            has_header,
        }
    }
}

/// Decodes delimited text into rows of string cells
///
/// Rows may have differing widths; width checks belong to the classifier.
/// The header row, when present, is dropped. Blank lines are skipped.
///
/// # Errors
///
/// Returns a `Serialization` error for malformed text (e.g. invalid UTF-8).
///
/// # Examples
///
/// ```
/// use consolidator::core::codec::{decode_rows, Dialect};
///
/// let rows = decode_rows(b"I,1,Amy,NYC\nD,2,Bo,LA\n", Dialect::comma(false)).unwrap();
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[1], vec!["D", "2", "Bo", "LA"]);
/// ```
pub fn decode_rows(data: &[u8], dialect: Dialect) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(dialect.delimiter)
        .has_headers(dialect.has_header)
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Encodes a materialized state as delimited text
///
/// One row per record in key order, snapshot column order, preceded by the
/// schema header when `dialect.has_header` is set.
pub fn encode_state(
    schema: &TableSchema,
    state: &MaterializedState,
    dialect: Dialect,
) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(dialect.delimiter)
        .from_writer(Vec::new());

    if dialect.has_header {
        writer.write_record(schema.header())?;
    }
    for record in state.records() {
        writer.write_record(record.to_cells())?;
    }

    writer
        .into_inner()
        .map_err(|e| ConsolidatorError::Serialization(format!("Failed to flush output: {e}")))
}

/// Decodes a previously published file back into a materialized state
///
/// # Errors
///
/// Returns `SchemaMismatch` if a row is not snapshot-width for `schema`.
pub fn decode_state(
    schema: &TableSchema,
    data: &[u8],
    dialect: Dialect,
) -> Result<MaterializedState> {
    if dialect.has_header {
        check_header(schema, data, dialect)?;
    }

    let records = decode_rows(data, dialect)?
        .into_iter()
        .enumerate()
        .map(|(i, cells)| Record::from_cells(schema, i + 1, cells))
        .collect::<Result<Vec<_>>>()?;

    Ok(MaterializedState::from_records(records))
}

fn check_header(schema: &TableSchema, data: &[u8], dialect: Dialect) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(dialect.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let header = reader.headers()?;
    if header.is_empty() {
        return Ok(());
    }

    let expected = schema.header();
    if header.len() != expected.len() {
        return Err(ConsolidatorError::SchemaMismatch {
            row: 0,
            found: header.len(),
            snapshot_width: schema.snapshot_width(),
            delta_width: schema.delta_width(),
        });
    }
    if !header.iter().eq(expected.iter().copied()) {
        tracing::warn!(
            found = ?header.iter().collect::<Vec<_>>(),
            expected = ?expected,
            "Published header differs from configured field names"
        );
    }
    Ok(())
}
