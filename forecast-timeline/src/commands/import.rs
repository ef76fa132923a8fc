use std::path::Path;

use forecast_timeline::import::{import_snapshot, read_snapshot};

use super::Runtime;

pub fn run(rt: &Runtime, file: &Path) -> anyhow::Result<u8> {
    let snapshot = read_snapshot(file)?;
    let mut conn = rt.open_db()?;
    let report = import_snapshot(&mut conn, &snapshot)?;

    println!("{}", serde_json::to_string(&report)?);
    Ok(0)
}
