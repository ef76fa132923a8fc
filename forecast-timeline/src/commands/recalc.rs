use anyhow::bail;

use forecast_data::ReviewStatus;
use forecast_timeline::engine::StageEdit;
use forecast_timeline::service;

use super::Runtime;

pub fn run(
    rt: &Runtime,
    opportunity: &str,
    service_line: &str,
    stage: &str,
    duration: Option<f64>,
    fte: Option<f64>,
    status: Option<&str>,
) -> anyhow::Result<u8> {
    if duration.is_none() && fte.is_none() && status.is_none() {
        bail!("nothing to change: pass at least one of --duration, --fte, --status");
    }

    let edit = StageEdit {
        service_line: service_line.to_string(),
        stage_code: stage.to_string(),
        duration_weeks: duration,
        fte_required: fte,
        status: status.map(str::parse::<ReviewStatus>).transpose()?,
    };

    let mut conn = rt.open_db()?;
    let timeline = service::recalculate_stage(&mut conn, &rt.context(), opportunity, &edit)?;

    println!("{}", serde_json::to_string_pretty(&timeline)?);
    Ok(0)
}
