use forecast_data::db::categories;
use forecast_timeline::engine::resolve_category;

use super::Runtime;

pub fn run(rt: &Runtime, value: f64, service_line: Option<&str>) -> anyhow::Result<u8> {
    let conn = rt.open_db()?;
    let table = match service_line {
        Some(line) => {
            let table = categories::list_scope(&conn, line)?;
            if table.is_empty() {
                categories::list_overall(&conn)?
            } else {
                table
            }
        }
        None => categories::list_overall(&conn)?,
    };

    println!("{}", resolve_category(Some(value), &table));
    Ok(0)
}
