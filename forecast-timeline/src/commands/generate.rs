use forecast_timeline::service;

use super::Runtime;

/// Exit code when regeneration is refused because of manual edits.
pub const EXIT_HAS_EDITS: u8 = 2;

pub fn run(rt: &Runtime, opportunity: &str, confirm_overwrite: bool) -> anyhow::Result<u8> {
    let mut conn = rt.open_db()?;
    let ctx = rt.context();

    let timeline = if confirm_overwrite {
        service::generate_timeline(&mut conn, &ctx, opportunity)?
    } else {
        match service::generate_if_unedited(&mut conn, &ctx, opportunity)? {
            Some(timeline) => timeline,
            None => {
                eprintln!(
                    "Timeline for '{}' has manual edits. Re-run with --confirm-overwrite to discard them.",
                    opportunity
                );
                return Ok(EXIT_HAS_EDITS);
            }
        }
    };

    for warning in &timeline.warnings {
        eprintln!("warning: {}", warning);
    }
    println!("{}", serde_json::to_string_pretty(&timeline)?);
    Ok(0)
}
