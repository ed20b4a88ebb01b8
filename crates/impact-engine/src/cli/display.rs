//! Common display utilities for CLI commands.

use anyhow::Result;
use colored::{ColoredString, Colorize};
use impact_engine::analyzer::ImpactResult;
use impact_engine::domain::ImpactLevel;
use serde::Serialize;

const MAX_DISPLAY_ITEMS: usize = 10;

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Color an impact level by severity.
fn colorize_level(level: ImpactLevel) -> ColoredString {
    let text = level.as_str();
    match level {
        ImpactLevel::None => text.dimmed(),
        ImpactLevel::Low => text.green(),
        ImpactLevel::Medium => text.yellow(),
        ImpactLevel::High => text.red(),
        ImpactLevel::Critical => text.red().bold(),
    }
}

/// Display an analysis result.
///
/// Shows the overall decision, up to `MAX_DISPLAY_ITEMS` impacted entities
/// ordered by severity, and optionally every path.
pub fn print_impact_result(result: &ImpactResult, show_paths: bool) {
    println!(
        "Impact of {} change to {}:",
        result.change_type.as_str().cyan(),
        result.root_entity.to_string().cyan().bold()
    );
    println!();

    let overall = &result.overall_impact;
    println!(
        "  {}: {} (score {})",
        "Worst impact".white().bold(),
        colorize_level(overall.worst_impact_level),
        overall.worst_risk_score
    );
    if let Some(entity) = &overall.triggering_entity {
        println!("  {}: {}", "Triggered by".white().bold(), entity);
        println!(
            "  {}: {}",
            "Via".white().bold(),
            overall.triggering_path_id.dimmed()
        );
    }
    println!(
        "  {}: {}",
        "Approval".white().bold(),
        if overall.requires_approval {
            "required".red().bold()
        } else {
            "not required".green()
        }
    );
    println!(
        "  {}: {} paths, {} entities, max depth {}",
        "Explored".white().bold(),
        result.total_paths,
        result.total_entities,
        result.max_depth_reached
    );
    if let Some(reason) = result.truncation_reason {
        println!(
            "  {}: results are partial ({} bound reached)",
            "warning".yellow(),
            reason
        );
    }
    println!(
        "  {}: {}",
        "Scoring".white().bold(),
        result.scoring_version.dimmed()
    );

    println!();
    println!("  {}:", "Impacted entities".white().bold());
    if result.entity_impacts.is_empty() {
        println!("    {}", "(none)".dimmed());
    }

    // Most severe first; stable sort keeps discovery order among equals
    let mut impacts: Vec<_> = result.entity_impacts.iter().collect();
    impacts.sort_by(|a, b| {
        (b.worst_case_impact_level, b.worst_case_risk_score)
            .cmp(&(a.worst_case_impact_level, a.worst_case_risk_score))
    });
    for impact in impacts.iter().take(MAX_DISPLAY_ITEMS) {
        println!(
            "    {} {} {} (worst {}, cumulative {}, {} paths)",
            "•".dimmed(),
            impact.entity,
            colorize_level(impact.worst_case_impact_level),
            impact.worst_case_risk_score,
            impact.cumulative_risk_score,
            impact.paths.len()
        );
    }
    if impacts.len() > MAX_DISPLAY_ITEMS {
        println!(
            "    {} ... and {} more",
            "•".dimmed(),
            impacts.len() - MAX_DISPLAY_ITEMS
        );
    }

    if show_paths {
        println!();
        println!("  {}:", "Paths".white().bold());
        for path in &result.paths {
            println!(
                "    {} {} {} ({})",
                "•".dimmed(),
                path.path_id(),
                colorize_level(path.impact_level()),
                path.risk_score()
            );
        }
    }
}
