use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use repro_debug::{DebugLog, debug_print};
use repro_types::{ReproError, SessionRecord};
use tokio::sync::Notify;
use tokio::task::{JoinError, JoinHandle};
use tokio_postgres::{Client, NoTls};
use tracing::{info, warn};

use crate::load::run_heartbeat_load;
use crate::selector::{SelectOptions, Selection, select_target};

pub const DEFAULT_DATABASE_URL: &str = "postgresql://root@10.0.0.90:25258/defaultdb?sslmode=disable";

pub const LIST_SESSIONS_SQL: &str = "WITH sessions AS (SHOW CLUSTER SESSIONS) \
     SELECT session_id, user_name, session_start::STRING AS session_start, \
     last_active_query, application_name FROM sessions";

pub const CANCEL_SESSION_SQL: &str = "CANCEL SESSION $1";

#[derive(Clone, Debug)]
pub struct CancelConfig {
    pub database_url: String,
    /// Head start for the heartbeat session before the listing is taken.
    pub warmup: Duration,
    /// Pause between picking the target and cancelling it, long enough to
    /// poke at the cluster by hand.
    pub inspect_pause: Duration,
    /// Grace period after the cancel statements before tearing down.
    pub settle: Duration,
    pub heartbeat_interval: Duration,
    pub select: SelectOptions,
}

impl Default for CancelConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            warmup: Duration::from_secs(3),
            inspect_pause: Duration::from_secs(3000),
            settle: Duration::from_secs(3),
            heartbeat_interval: Duration::from_secs(1),
            select: SelectOptions::default(),
        }
    }
}

#[derive(Debug)]
pub struct CancelReport {
    pub selection: Selection,
    pub cancelled: bool,
    /// How the heartbeat worker ended: completed rounds, or the error that
    /// stopped it (normally the cancellation itself).
    pub load_outcome: Result<u64, ReproError>,
}

/// Open a pgwire connection and drive it on a background task.
pub async fn connect(database_url: &str) -> Result<Client, ReproError> {
    let (client, connection) = tokio_postgres::connect(database_url, NoTls)
        .await
        .map_err(|e| ReproError::connect(database_url, e))?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            warn!(%e, "database connection ended with error");
        }
    });
    Ok(client)
}

pub async fn list_sessions(client: &Client) -> Result<Vec<SessionRecord>, ReproError> {
    let rows = client
        .query(LIST_SESSIONS_SQL, &[])
        .await
        .map_err(|e| ReproError::query("list cluster sessions", e))?;

    let mut sessions = Vec::with_capacity(rows.len());
    for row in &rows {
        let record = SessionRecord::try_from(row)?;
        info!(
            session_id = %record.session_id,
            user_name = %record.user_name,
            session_start = %record.session_start,
            last_active_query = %record.last_active_query,
            "session"
        );
        sessions.push(record);
    }
    Ok(sessions)
}

/// Connect, list every session and run the selector over the listing.
pub async fn inspect_sessions(
    database_url: &str,
    options: &SelectOptions,
) -> Result<(Vec<SessionRecord>, Selection), ReproError> {
    let client = connect(database_url).await?;
    let sessions = list_sessions(&client).await?;
    let selection = select_target(&sessions, options);
    Ok((sessions, selection))
}

/// Which client call carries a `CANCEL SESSION` statement. The reproduction
/// sends it once through each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelPath {
    /// Row-returning call; reports how many rows came back.
    Query,
    /// Statement call; reports the affected-row count.
    Execute,
}

impl CancelPath {
    fn describe(self) -> &'static str {
        match self {
            Self::Query => "cancel session (query path)",
            Self::Execute => "cancel session (execute path)",
        }
    }
}

/// The administrative session: lists the cluster's sessions and cancels one.
pub trait SessionAdmin {
    fn list(&self) -> impl Future<Output = Result<Vec<SessionRecord>, ReproError>> + Send;

    fn cancel(
        &self,
        session_id: &str,
        path: CancelPath,
    ) -> impl Future<Output = Result<u64, ReproError>> + Send;
}

impl SessionAdmin for Client {
    fn list(&self) -> impl Future<Output = Result<Vec<SessionRecord>, ReproError>> + Send {
        list_sessions(self)
    }

    fn cancel(
        &self,
        session_id: &str,
        path: CancelPath,
    ) -> impl Future<Output = Result<u64, ReproError>> + Send {
        async move {
            match path {
                CancelPath::Query => {
                    let rows = self
                        .query(CANCEL_SESSION_SQL, &[&session_id])
                        .await
                        .map_err(|e| ReproError::query(path.describe(), e))?;
                    for row in &rows {
                        info!(columns = row.len(), "cancel session returned a row");
                    }
                    Ok(rows.len() as u64)
                }
                CancelPath::Execute => self
                    .execute(CANCEL_SESSION_SQL, &[&session_id])
                    .await
                    .map_err(|e| ReproError::query(path.describe(), e)),
            }
        }
    }
}

/// End-to-end reproduction: busy session, listing, pause, cancel.
pub async fn run_cancel_repro(
    config: &CancelConfig,
    debug: DebugLog,
) -> Result<CancelReport, ReproError> {
    let stop = Arc::new(Notify::new());
    let worker = tokio::spawn(run_heartbeat_load(
        config.database_url.clone(),
        config.heartbeat_interval,
        Arc::clone(&stop),
        debug,
    ));
    supervise_cancel(config, worker, stop, connect(&config.database_url), debug).await
}

/// Drive the cancel sequence against an already running heartbeat worker.
///
/// The worker is watched from warm-up until the cancel statements go out: if
/// it ends in that window the reproduction cannot happen, and its error (or
/// a `Query` error when it stopped on its own) is returned. After the cancel
/// the worker is expected to fail; whatever it returns lands in
/// [`CancelReport::load_outcome`].
///
/// On every other path the worker is told to stop and joined before this
/// returns.
pub async fn supervise_cancel<A, C>(
    config: &CancelConfig,
    mut worker: JoinHandle<Result<u64, ReproError>>,
    stop: Arc<Notify>,
    connect_admin: C,
    debug: DebugLog,
) -> Result<CancelReport, ReproError>
where
    A: SessionAdmin,
    C: Future<Output = Result<A, ReproError>>,
{
    let prepare = async {
        tokio::time::sleep(config.warmup).await;
        let admin = connect_admin.await?;
        let sessions = admin.list().await?;
        let selection = select_target(&sessions, &config.select);
        for statement in selection.cancel_statements() {
            println!("{statement}");
        }
        if let Some(target) = &selection.target {
            info!(%target, "target session");
            tokio::time::sleep(config.inspect_pause).await;
        }
        Ok::<_, ReproError>((admin, selection))
    };

    let prepared = tokio::select! {
        prepared = prepare => prepared,
        joined = &mut worker => {
            let err = match flatten_join(joined) {
                Ok(rounds) => ReproError::query(
                    "heartbeat worker",
                    format!("stopped after {rounds} rounds before the cancel"),
                ),
                Err(e) => e,
            };
            warn!(%err, "heartbeat worker ended before the cancel");
            return Err(err);
        }
    };

    let (admin, selection) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            stop_worker(&stop, worker).await;
            return Err(e);
        }
    };

    let Some(target) = selection.target.clone() else {
        warn!(
            matched = selection.matched.len(),
            tie_break = %config.select.tie_break,
            "no target session selected; skipping cancellation"
        );
        let load_outcome = stop_worker(&stop, worker).await;
        return Ok(CancelReport {
            selection,
            cancelled: false,
            load_outcome,
        });
    };

    for path in [CancelPath::Query, CancelPath::Execute] {
        match admin.cancel(&target, path).await {
            Ok(count) => {
                debug_print!(debug, "{} of {target} reported {count} rows", path.describe());
            }
            Err(e) => {
                stop_worker(&stop, worker).await;
                return Err(e);
            }
        }
    }

    tokio::time::sleep(config.settle).await;
    let load_outcome = stop_worker(&stop, worker).await;
    Ok(CancelReport {
        selection,
        cancelled: true,
        load_outcome,
    })
}

fn flatten_join(
    joined: Result<Result<u64, ReproError>, JoinError>,
) -> Result<u64, ReproError> {
    joined.unwrap_or_else(|e| Err(ReproError::query("heartbeat worker", e)))
}

async fn stop_worker(
    stop: &Notify,
    worker: JoinHandle<Result<u64, ReproError>>,
) -> Result<u64, ReproError> {
    stop.notify_one();
    let outcome = flatten_join(worker.await);
    match &outcome {
        Ok(rounds) => info!(rounds, "heartbeat worker finished"),
        Err(e) => warn!(%e, "heartbeat worker ended with error"),
    }
    outcome
}
