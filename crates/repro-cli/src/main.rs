use facet::Facet;
use figue as args;
use repro_debug::DebugLog;
use std::path::PathBuf;

mod scenarios;

type AnyResult<T> = Result<T, String>;

const DATABASE_URL_ENV: &str = "REPRO_DATABASE_URL";
const STORE_DIR_ENV: &str = "REPRO_STORE_DIR";
const DEBUG_ENV: &str = "REPRO_DEBUG";

#[derive(Facet, Debug)]
struct Cli {
    #[facet(flatten)]
    builtins: args::FigueBuiltins,
    /// Turn on conditional debug output.
    #[facet(args::named, default)]
    debug: bool,
    /// Print records as JSON lines instead of text.
    #[facet(args::named, default)]
    json: bool,
    #[facet(args::named, default)]
    database_url: Option<String>,
    #[facet(args::named, default)]
    store_dir: Option<String>,
    #[facet(args::subcommand)]
    command: CommandKind,
}

#[derive(Facet, Debug)]
#[repr(u8)]
enum CommandKind {
    /// Keep a heartbeat session busy, find it in the session listing, cancel it.
    SqlCancel {
        #[facet(args::named, default)]
        warmup_secs: Option<u64>,
        #[facet(args::named, default)]
        inspect_pause_secs: Option<u64>,
        #[facet(args::named, default)]
        tie_break: Option<String>,
    },
    /// List cluster sessions and show which one would be cancelled.
    ListSessions {
        #[facet(args::named, default)]
        tie_break: Option<String>,
    },
    /// Print snapshot entries whose value carries the debug marker.
    StorageScan {
        #[facet(args::named, default)]
        marker: Option<String>,
        #[facet(args::named, default)]
        max_value_len: Option<usize>,
    },
    /// Write and read back a single key.
    StorageProbe,
    /// Count error and warning lines in a test or lint log.
    LogStats {
        #[facet(args::named)]
        log_file: String,
    },
}

struct Config {
    database_url: String,
    store_dir: PathBuf,
    debug: DebugLog,
    json: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> AnyResult<()> {
    let cli = parse_cli()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cfg = config_from_cli(&cli);
    dispatch_command(&cfg, cli.command).await
}

fn parse_cli() -> AnyResult<Cli> {
    let figue_config = args::builder::<Cli>()
        .map_err(|e| format!("failed to build CLI schema: {e}"))?
        .cli(|cli| cli.strict())
        .help(|h| {
            h.program_name("repro")
                .description("Reproducers for session cancellation and storage inspection")
                .version(option_env!("CARGO_PKG_VERSION").unwrap_or("dev"))
        })
        .build();

    args::Driver::new(figue_config)
        .run()
        .into_result()
        .map(|v| v.value)
        .map_err(|e| e.to_string())
}

fn config_from_cli(cli: &Cli) -> Config {
    let database_url = cli
        .database_url
        .clone()
        .or_else(|| std::env::var(DATABASE_URL_ENV).ok())
        .unwrap_or_else(|| repro_sessions::DEFAULT_DATABASE_URL.to_owned());

    let store_dir = cli
        .store_dir
        .clone()
        .or_else(|| std::env::var(STORE_DIR_ENV).ok())
        .unwrap_or_else(|| repro_store::DEFAULT_STORE_DIR.to_owned());

    let debug = cli.debug || std::env::var(DEBUG_ENV).is_ok_and(|v| is_truthy(&v));

    Config {
        database_url,
        store_dir: PathBuf::from(store_dir),
        debug: DebugLog::new(debug),
        json: cli.json,
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

async fn dispatch_command(cfg: &Config, command: CommandKind) -> AnyResult<()> {
    match command {
        CommandKind::SqlCancel {
            warmup_secs,
            inspect_pause_secs,
            tie_break,
        } => {
            scenarios::sql_cancel::run(cfg, warmup_secs, inspect_pause_secs, tie_break.as_deref())
                .await
        }
        CommandKind::ListSessions { tie_break } => {
            scenarios::list_sessions::run(cfg, tie_break.as_deref()).await
        }
        CommandKind::StorageScan {
            marker,
            max_value_len,
        } => scenarios::storage_scan::run(cfg, marker, max_value_len).await,
        CommandKind::StorageProbe => scenarios::storage_probe::run(cfg).await,
        CommandKind::LogStats { log_file } => scenarios::log_stats::run(&PathBuf::from(log_file)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(is_truthy(value), "{value:?} should enable debug");
        }
        for value in ["", "0", "false", "off", "nope"] {
            assert!(!is_truthy(value), "{value:?} should not enable debug");
        }
    }
}
