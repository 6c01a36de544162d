//! JSON export of result records.
//!
//! ```text
//! pagerank → [{"name": 3, "score": 1.1}, {"name": 1, "score": 0.15}]
//! bfs      → [{"path": [{"name": 1}, {"name": 2}, {"name": 3}]}]
//! ```

use std::io::Write;

use serde::Serialize;

use crate::Result;

/// Render records as a compact JSON array.
pub fn records_to_json<T: Serialize>(records: &[T]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

/// Write records as pretty-printed JSON followed by a newline.
pub fn write_records<T: Serialize>(records: &[T], writer: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, records)?;
    writeln!(writer)?;
    Ok(())
}
