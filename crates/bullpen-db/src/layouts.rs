use bullpen_layout::LayoutItem;
use rusqlite::{params, Connection, OptionalExtension};

/// Read a team's persisted freeform layout.
///
/// An unreadable row (malformed JSON) is discarded with a warning and read
/// as absent; callers fall back to default placement and the next write
/// replaces the bad row.
pub fn get(conn: &Connection, team_id: &str) -> rusqlite::Result<Option<Vec<LayoutItem>>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT items FROM layouts WHERE team_id = ?1",
            params![team_id],
            |row| row.get(0),
        )
        .optional()?;

    let Some(raw) = raw else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(items) => Ok(Some(items)),
        Err(e) => {
            log::warn!("discarding unreadable layout for team {team_id}: {e}");
            Ok(None)
        }
    }
}

pub fn set(conn: &Connection, team_id: &str, items: &[LayoutItem]) -> rusqlite::Result<()> {
    let json = serde_json::to_string(items)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    conn.execute(
        "INSERT INTO layouts (team_id, items) VALUES (?1, ?2) \
         ON CONFLICT(team_id) DO UPDATE SET items = excluded.items",
        params![team_id, json],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, team_id: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute("DELETE FROM layouts WHERE team_id = ?1", params![team_id])?;
    Ok(changed > 0)
}

/// All persisted layouts, for the startup load. Unreadable rows are
/// skipped the same way [`get`] skips them.
pub fn list_all(conn: &Connection) -> rusqlite::Result<Vec<(String, Vec<LayoutItem>)>> {
    let mut stmt = conn.prepare("SELECT team_id, items FROM layouts")?;
    let rows = stmt.query_map([], |row| {
        let team_id: String = row.get(0)?;
        let raw: String = row.get(1)?;
        Ok((team_id, raw))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (team_id, raw) = row?;
        match serde_json::from_str(&raw) {
            Ok(items) => out.push((team_id, items)),
            Err(e) => log::warn!("discarding unreadable layout for team {team_id}: {e}"),
        }
    }
    Ok(out)
}
