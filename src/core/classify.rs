//! Batch classification
//!
//! A batch is classified by row width alone: `values + 1` columns is a
//! snapshot, `values + 2` is a delta. Two logical shapes are told apart only
//! by column count, so upstream exports must never produce a delta that is
//! snapshot-width for the same table. Nothing here can detect that.

use crate::domain::{
    Batch, BatchKind, ChangeOperation, ConsolidatorError, RawBatch, Record, Result, TableSchema,
};

/// Determines the batch kind from a row width
///
/// # Errors
///
/// Returns `SchemaMismatch` if `width` matches neither shape. `row` is only
/// used for the error.
pub fn detect_kind(schema: &TableSchema, width: usize, row: usize) -> Result<BatchKind> {
    if width == schema.snapshot_width() {
        Ok(BatchKind::Snapshot)
    } else if width == schema.delta_width() {
        Ok(BatchKind::Delta)
    } else {
        Err(ConsolidatorError::SchemaMismatch {
            row,
            found: width,
            snapshot_width: schema.snapshot_width(),
            delta_width: schema.delta_width(),
        })
    }
}

/// Classifies and parses a decoded batch
///
/// The width of the first row decides the kind; every row must then parse
/// as that kind. Any failing row rejects the whole batch.
///
/// # Errors
///
/// - `SchemaMismatch` for an empty batch, an unknown width, or a row whose
///   width differs from the first row
/// - `UnrecognizedOperation` for a delta row with a code other than I/U/D
///
/// # Examples
///
/// ```
/// use consolidator::core::classify::classify;
/// use consolidator::domain::{BatchId, BatchKind, RawBatch, TableSchema};
///
/// let rows = vec![vec!["1".to_string(), "Amy".to_string(), "NYC".to_string()]];
/// let raw = RawBatch::new(BatchId::new("full.csv").unwrap(), rows);
/// let batch = classify(&TableSchema::person(), raw).unwrap();
/// assert_eq!(batch.kind(), BatchKind::Snapshot);
/// ```
pub fn classify(schema: &TableSchema, raw: RawBatch) -> Result<Batch> {
    let width = raw.rows.first().map(Vec::len).unwrap_or(0);
    let kind = detect_kind(schema, width, if raw.is_empty() { 0 } else { 1 })?;

    let batch = match kind {
        BatchKind::Snapshot => Batch::Snapshot(
            raw.rows
                .into_iter()
                .enumerate()
                .map(|(i, cells)| Record::from_cells(schema, i + 1, cells))
                .collect::<Result<Vec<_>>>()?,
        ),
        BatchKind::Delta => Batch::Delta(
            raw.rows
                .into_iter()
                .enumerate()
                .map(|(i, cells)| ChangeOperation::from_cells(schema, i + 1, cells))
                .collect::<Result<Vec<_>>>()?,
        ),
    };

    tracing::info!(
        batch_id = %raw.id,
        kind = %batch.kind(),
        rows = batch.len(),
        "Detected batch type"
    );

    Ok(batch)
}
