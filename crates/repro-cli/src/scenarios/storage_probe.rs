use repro_store::probe_write;

use crate::Config;

pub async fn run(cfg: &Config) -> Result<(), String> {
    let dir = cfg.store_dir.clone();
    let (key, value) = tokio::task::spawn_blocking(move || probe_write(&dir))
        .await
        .map_err(|e| format!("storage probe task failed: {e}"))?
        .map_err(|e| e.to_string())?;
    println!("{key} {value}");
    Ok(())
}
