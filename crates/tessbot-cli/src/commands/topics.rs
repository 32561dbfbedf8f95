//! The `tessbot topics` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use tessbot_core::QuizApi;

pub async fn execute(
    unit_id: u64,
    token: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_, client) = super::connect(token, config_path.as_deref())?;
    let topics = client.unit_topics(unit_id).await?;

    if topics.is_empty() {
        println!("Unit {unit_id} has no topics.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Topic ID", "Name", "Quiz"]);
    for topic in &topics {
        table.add_row(vec![
            Cell::new(topic.id),
            Cell::new(&topic.name),
            Cell::new(if topic.has_quiz { "yes" } else { "no" }),
        ]);
    }
    println!("{table}");

    Ok(())
}
