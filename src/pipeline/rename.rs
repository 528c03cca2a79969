use std::collections::HashMap;

use tracing::debug;

use crate::table::RecordTable;

/// Replace coded column names with their descriptive labels.
///
/// Columns without an entry in the map keep their original names; cell
/// values and row order are untouched. The map is checked for duplicate
/// targets when the schema is built, so two source columns can never
/// silently merge here.
pub fn rename_columns(table: &mut RecordTable, map: &HashMap<&'static str, &'static str>) {
    let mut renamed = 0;
    for index in 0..table.column_count() {
        let label = map.get(table.column_name(index)).copied();
        if let Some(label) = label {
            table.set_column_name(index, label.to_string());
            renamed += 1;
        }
    }
    debug!("Renamed {} of {} columns", renamed, table.column_count());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    #[test]
    fn test_mapped_columns_get_descriptive_names() {
        let mut table = RecordTable::from_csv_str("ID,Q1,Latitude\n7,34,-6.8").unwrap();
        let map = HashMap::from([("ID", "User ID"), ("Q1", "Age")]);

        rename_columns(&mut table, &map);

        // Every mapped short code is gone, replaced by its label
        assert_eq!(table.column_names(), &["User ID", "Age", "Latitude"]);
        // Cell data is unchanged aside from the names
        assert_eq!(table.value(0, 0), &Value::Int(7));
        assert_eq!(table.value(0, 1), &Value::Int(34));
    }

    #[test]
    fn test_unmapped_columns_pass_through() {
        let mut table = RecordTable::from_csv_str("A,B\n1,2").unwrap();
        let map = HashMap::from([("A", "Alpha")]);

        rename_columns(&mut table, &map);

        assert_eq!(table.column_names(), &["Alpha", "B"]);
    }
}
