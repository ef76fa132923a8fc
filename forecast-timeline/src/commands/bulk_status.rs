use forecast_data::ReviewStatus;
use forecast_timeline::engine::BulkScope;
use forecast_timeline::service;

use super::Runtime;

pub fn run(rt: &Runtime, opportunity: &str, status: &str, service_line: Option<&str>) -> anyhow::Result<u8> {
    let status: ReviewStatus = status.parse()?;
    let scope = match service_line {
        Some(line) => BulkScope::ServiceLine(line.to_string()),
        None => BulkScope::All,
    };

    let mut conn = rt.open_db()?;
    let outcome = service::bulk_set_status(&mut conn, &rt.context(), opportunity, status, &scope)?;

    let output = serde_json::json!({
        "opportunity_id": opportunity,
        "status": status,
        "applied": outcome.applied,
        "changed": outcome.changed,
    });
    println!("{}", serde_json::to_string(&output)?);
    Ok(0)
}
