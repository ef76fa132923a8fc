use std::collections::BTreeMap;

use forecast_data::ReviewStatus;
use forecast_timeline::engine::status::valid_transitions;

use super::Runtime;

pub fn show(rt: &Runtime) -> anyhow::Result<u8> {
    let policy = rt.config.transition_policy;
    let allowed: BTreeMap<String, Vec<ReviewStatus>> = ReviewStatus::ALL
        .into_iter()
        .map(|from| (from.to_string(), valid_transitions(policy, from)))
        .collect();

    let output = serde_json::json!({
        "db_path": rt.db_path,
        "lifecycle": rt.config.lifecycle,
        "schedulable_lead_lines": rt.config.schedulable_lead_lines,
        "transition_policy": policy,
        "allowed_transitions": allowed,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(0)
}
