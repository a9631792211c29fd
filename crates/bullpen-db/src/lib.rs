//! Durable store for the bullpen workspace: teams, per-team freeform
//! layouts, and a small settings key/value table, all in one SQLite file.

pub mod layouts;
pub mod schema;
pub mod settings;
pub mod teams;

use rusqlite::Connection;
use std::path::Path;

pub use teams::{AgentConfig, Team};

pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    schema::initialize(&conn)?;
    Ok(conn)
}

/// Open a throwaway in-memory database (tests, dry runs).
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    schema::initialize(&conn)?;
    Ok(conn)
}
