use crate::models::{DeviceTable, EnergyDataTable, Table};

/// Holds the table definitions in creation order. `energy_data` references
/// `devices`, so disposal runs in reverse.
pub struct SchemaManager {
    tables: Vec<Box<dyn Table>>,
}

impl SchemaManager {
    pub fn new(tables: Vec<Box<dyn Table>>) -> Self {
        Self { tables }
    }

    pub fn create_schema(&self) -> Vec<String> {
        self.tables.iter().map(|table| table.create()).collect()
    }

    pub fn dispose_schema(&self) -> Vec<String> {
        self.tables.iter().rev().map(|table| table.dispose()).collect()
    }
}

impl Default for SchemaManager {
    fn default() -> Self {
        SchemaManager::new(vec![Box::new(DeviceTable), Box::new(EnergyDataTable)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispose_runs_in_reverse_order() {
        let manager = SchemaManager::default();
        let statements = manager.dispose_schema();

        assert_eq!(statements[0], "DROP TABLE IF EXISTS energy_data;");
        assert_eq!(statements[1], "DROP TABLE IF EXISTS devices;");
    }

    #[test]
    fn test_create_schema_starts_with_devices() {
        let manager = SchemaManager::default();
        let statements = manager.create_schema();

        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("CREATE TABLE IF NOT EXISTS devices"));
        assert!(statements[1].contains("CREATE TABLE IF NOT EXISTS energy_data"));
    }
}
