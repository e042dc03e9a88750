use crate::store::{JsonSolutionStore, SolutionStore};
use anyhow::{Context, Result};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use std::path::Path;

pub fn runs_table(store: &JsonSolutionStore) -> Result<Table> {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["run", "solver", "created", "solutions"]);

    for id in store.list()? {
        match store.load(&id) {
            Ok(record) => {
                table.add_row(vec![
                    id.to_string(),
                    record.solver,
                    record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    record.solutions.len().to_string(),
                ]);
            }
            Err(e) => log::warn!("Skipping unreadable run {}: {}", id, e),
        }
    }
    Ok(table)
}

pub fn list_runs(dir: &Path) -> Result<()> {
    let store = JsonSolutionStore::new(dir);
    let table = runs_table(&store)
        .with_context(|| format!("Failed to list runs in {}", dir.display()))?;
    println!("{}", table);
    Ok(())
}
