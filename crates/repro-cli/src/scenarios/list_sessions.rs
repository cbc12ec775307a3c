use repro_sessions::inspect_sessions;

use super::{select_options, target_line};
use crate::Config;

pub async fn run(cfg: &Config, tie_break: Option<&str>) -> Result<(), String> {
    let options = select_options(tie_break)?;
    let (sessions, selection) = inspect_sessions(&cfg.database_url, &options)
        .await
        .map_err(|e| e.to_string())?;

    if cfg.json {
        for session in &sessions {
            let json =
                facet_json::to_string(session).map_err(|e| format!("encode session: {e}"))?;
            println!("{json}");
        }
        let json =
            facet_json::to_string(&selection).map_err(|e| format!("encode selection: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    for statement in selection.cancel_statements() {
        println!("{statement}");
    }
    println!("{}", target_line(&selection));
    Ok(())
}
