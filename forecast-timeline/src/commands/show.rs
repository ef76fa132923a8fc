use forecast_data::db::timelines::StoredTimeline;
use forecast_timeline::engine::summarize;
use forecast_timeline::service;

use super::Runtime;

pub fn run(rt: &Runtime, opportunity: &str, json: bool) -> anyhow::Result<u8> {
    let conn = rt.open_db()?;
    let stored = service::load_timeline(&conn, opportunity)?;

    if json {
        let output = serde_json::json!({
            "timeline": stored.timeline,
            "summary": summarize(&stored.timeline),
            "updated_at": stored.updated_at.to_rfc3339(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text(&stored);
    }
    Ok(0)
}

fn print_text(stored: &StoredTimeline) {
    let timeline = &stored.timeline;
    let summary = summarize(timeline);

    println!("Opportunity:   {}", timeline.opportunity_id);
    println!("Close date:    {}", timeline.anchor_date);
    println!("Current stage: {}", timeline.current_stage);
    println!("Category:      {}", timeline.opportunity_category);
    println!(
        "Edited:        {}",
        if timeline.has_manual_edits() { "yes" } else { "no" }
    );
    println!("Updated:       {}", stored.updated_at.to_rfc3339());

    if timeline.service_lines.is_empty() {
        println!();
        println!("No service lines scheduled.");
    }

    for (line, schedule) in &timeline.service_lines {
        println!();
        println!(
            "{} ({}, {})",
            line,
            schedule.category,
            schedule.strategy.label()
        );
        println!(
            "{:<8} {:<12} {:<12} {:>7} {:>6} {:>8} {:<10}",
            "STAGE", "START", "END", "WEEKS", "FTE", "EFFORT", "STATUS"
        );
        println!("{}", "-".repeat(70));
        for entry in &schedule.entries {
            println!(
                "{:<8} {:<12} {:<12} {:>7.2} {:>6.2} {:>8.2} {:<10}",
                entry.stage_code,
                entry.start_date.to_string(),
                entry.end_date.to_string(),
                entry.duration_weeks,
                entry.fte_required,
                entry.total_effort_weeks,
                entry.status.to_string(),
            );
        }
    }

    println!();
    println!("Total effort:  {:.2} FTE-weeks", summary.total_effort_weeks);
    println!("Peak FTE:      {:.2}", summary.peak_concurrent_fte);

    for warning in &timeline.warnings {
        println!("warning: {}", warning);
    }
}
