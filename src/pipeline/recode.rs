use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::table::{RecordTable, Value};

/// Replace integer survey codes with their descriptive labels, one column
/// at a time.
///
/// Runs strictly after renaming: the map is keyed by descriptive column
/// names. Cells whose value has no entry in the column's map pass through
/// unchanged, which also makes the operation idempotent — an already
/// recoded cell is text and never matches an integer key again.
pub fn recode_values(
    table: &mut RecordTable,
    maps: &HashMap<&'static str, HashMap<i64, &'static str>>,
) -> Result<()> {
    for (&column, value_map) in maps {
        let col = table.column_index(column)?;

        let mut recoded = 0;
        for row in 0..table.row_count() {
            let label = table
                .value(row, col)
                .as_int()
                .and_then(|code| value_map.get(&code).copied());
            if let Some(label) = label {
                table.set(row, col, Value::Text(label.to_string()));
                recoded += 1;
            }
        }
        debug!("Recoded {} cells in column {}", recoded, column);
    }

    Ok(())
}
