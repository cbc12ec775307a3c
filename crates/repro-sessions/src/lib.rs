//! Session-cancel reproducer.
//!
//! One connection keeps a synthetic heartbeat query busy
//! ([`run_heartbeat_load`]); a second one lists every session on the
//! cluster, picks the heartbeat session out of the listing
//! ([`select_target`]) and cancels it ([`run_cancel_repro`]).

mod driver;
mod load;
mod selector;

pub use driver::{
    CANCEL_SESSION_SQL, CancelConfig, CancelPath, CancelReport, DEFAULT_DATABASE_URL,
    LIST_SESSIONS_SQL, SessionAdmin, connect, inspect_sessions, list_sessions, run_cancel_repro,
    supervise_cancel,
};
pub use load::{
    HEARTBEAT_MARKER, HEARTBEAT_QUERY, LOAD_QUERY, LOGGED_ROUNDS, LoadSession, heartbeat_loop,
    run_heartbeat_load,
};
pub use selector::{
    DRIVER_APPLICATION, SelectOptions, Selection, TieBreak, cancel_statement, select_target,
};
