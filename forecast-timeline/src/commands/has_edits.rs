use forecast_timeline::service;

use super::Runtime;

pub fn run(rt: &Runtime, opportunity: &str) -> anyhow::Result<u8> {
    let conn = rt.open_db()?;
    println!("{}", service::has_manual_edits(&conn, opportunity)?);
    Ok(0)
}
