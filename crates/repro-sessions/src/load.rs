use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use repro_debug::{DebugLog, debug_print};
use repro_types::ReproError;
use tokio::sync::Notify;
use tokio_postgres::Client;
use tracing::info;

use crate::driver::connect;

pub const HEARTBEAT_MARKER: &str = ">>> HEARTBEAT <<<";

/// Cheap statement run before every expensive round so that the session's
/// last completed query carries the marker while the aggregate is still in
/// flight.
pub const HEARTBEAT_QUERY: &str = "SELECT '>>> HEARTBEAT <<<'";

pub const LOAD_QUERY: &str = "SELECT COUNT(*), '>>> HEARTBEAT <<<' AS heartbeat \
     FROM generate_series(1, 100000000) AS gs, generate_series(1, 100) AS gs2";

/// Only the first few rounds are logged; the loop is expected to run for a
/// long time.
pub const LOGGED_ROUNDS: u64 = 7;

/// The busy session: one call is one heartbeat round, returning the counts
/// the load query produced.
pub trait LoadSession {
    fn run_round(&mut self) -> impl Future<Output = Result<Vec<i64>, ReproError>> + Send;
}

impl LoadSession for Client {
    fn run_round(&mut self) -> impl Future<Output = Result<Vec<i64>, ReproError>> + Send {
        async move {
            self.simple_query(HEARTBEAT_QUERY)
                .await
                .map_err(|e| ReproError::query("heartbeat marker query", e))?;
            let rows = self
                .query(LOAD_QUERY, &[])
                .await
                .map_err(|e| ReproError::query("heartbeat load query", e))?;
            rows.iter()
                .map(|row| {
                    row.try_get::<_, i64>(0)
                        .map_err(|e| ReproError::decode("count", e))
                })
                .collect()
        }
    }
}

/// Connect and keep one session busy with [`LOAD_QUERY`] until `stop` is
/// notified. See [`heartbeat_loop`].
pub async fn run_heartbeat_load(
    database_url: String,
    interval: Duration,
    stop: Arc<Notify>,
    debug: DebugLog,
) -> Result<u64, ReproError> {
    let mut client = connect(&database_url).await?;
    info!("heartbeat session connected");
    heartbeat_loop(&mut client, interval, &stop, debug).await
}

/// Run rounds until `stop` is notified, sleeping `interval` in between.
///
/// `stop` is checked at every iteration boundary and while a round is in
/// flight. Returns the number of completed rounds. Any round error ends the
/// loop and is handed back to the caller; once the session is cancelled from
/// the outside that is the expected way out.
pub async fn heartbeat_loop<S: LoadSession>(
    session: &mut S,
    interval: Duration,
    stop: &Notify,
    debug: DebugLog,
) -> Result<u64, ReproError> {
    let mut rounds: u64 = 0;
    loop {
        let counts = tokio::select! {
            biased;
            _ = stop.notified() => break,
            counts = session.run_round() => counts?,
        };

        if rounds < LOGGED_ROUNDS {
            for count in &counts {
                info!(round = rounds, count, "heartbeat round finished");
            }
        }
        debug_print!(debug, "heartbeat round {rounds} returned {} rows", counts.len());
        rounds += 1;

        tokio::select! {
            biased;
            _ = stop.notified() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!(rounds, "heartbeat load stopped");
    Ok(rounds)
}
