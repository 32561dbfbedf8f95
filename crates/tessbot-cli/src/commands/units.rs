//! The `tessbot units` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use tessbot_core::QuizApi;

pub async fn execute(
    subject_id: u64,
    token: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_, client) = super::connect(token, config_path.as_deref())?;
    let units = client.subject_units(subject_id).await?;

    if units.is_empty() {
        println!("Subject {subject_id} has no units.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Unit ID", "Name"]);
    for unit in &units {
        table.add_row(vec![Cell::new(unit.id), Cell::new(&unit.name)]);
    }
    println!("{table}");
    println!("\nRun them all with: tessbot run --subject {subject_id}");

    Ok(())
}
