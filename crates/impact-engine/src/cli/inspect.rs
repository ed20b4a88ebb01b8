//! `impact inspect` command implementation.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use impact_engine::supplier::{GraphSupplier, JsonlGraphSupplier};

use super::display::print_json;

/// Run the inspect command.
pub async fn run(graph_dir: &Path, project: i64, json: bool) -> Result<()> {
    let supplier = JsonlGraphSupplier::new(graph_dir);
    let graph = supplier.load_graph(project).await?;
    let summary = graph.summary();

    if json {
        return print_json(&summary);
    }

    println!(
        "{} {}",
        "Graph for project".cyan().bold(),
        project.to_string().cyan().bold()
    );
    println!();
    println!("  {}: {}", "Nodes".white().bold(), summary.node_count);
    println!("  {}: {}", "Edges".white().bold(), summary.edge_count);

    let dangling = summary.dangling_edge_count.to_string();
    println!(
        "  {}: {}",
        "Dangling edges".white().bold(),
        if summary.dangling_edge_count == 0 {
            dangling.green()
        } else {
            dangling.yellow()
        }
    );

    if summary.cycles.is_empty() {
        println!("  {}", "No dependency cycles.".green());
        return Ok(());
    }

    println!(
        "  {}: {}",
        "Cycles".white().bold(),
        summary.cycles.len().to_string().red().bold()
    );
    for cycle in &summary.cycles {
        // Display cycle as: a → b → c → a
        let mut chain = cycle.join(" → ");
        if let Some(first) = cycle.first() {
            chain.push_str(" → ");
            chain.push_str(first);
        }
        println!("    {} {}", "•".dimmed(), chain.dimmed());
    }

    Ok(())
}
