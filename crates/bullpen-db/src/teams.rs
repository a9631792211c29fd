use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

/// One agent slot in a team's configuration template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    pub role: String,
    pub prompt_id: String,
    pub work_dir: String,
    pub cli_type: String,
}

/// A named group of sessions sharing a layout and a communication room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub agents: Vec<AgentConfig>,
    pub grid_layout: String,
    pub chat_dir: String,
    pub custom_prompt: String,
    pub created_at: String,
}

fn team_from_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    let agents_json: String = row.get(2)?;
    let agents = serde_json::from_str(&agents_json).unwrap_or_else(|e| {
        log::warn!("discarding unreadable agents column: {e}");
        Vec::new()
    });

    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        agents,
        grid_layout: row.get(3)?,
        chat_dir: row.get(4)?,
        custom_prompt: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const TEAM_COLUMNS: &str = "id, name, agents, grid_layout, chat_dir, custom_prompt, created_at";

pub fn list_teams(conn: &Connection) -> rusqlite::Result<Vec<Team>> {
    // rowid keeps creation order even when created_at collides.
    let mut stmt = conn.prepare(&format!(
        "SELECT {TEAM_COLUMNS} FROM teams ORDER BY rowid"
    ))?;
    let rows = stmt.query_map([], team_from_row)?;
    rows.collect()
}

pub fn get_team(conn: &Connection, id: &str) -> rusqlite::Result<Option<Team>> {
    conn.query_row(
        &format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = ?1"),
        params![id],
        team_from_row,
    )
    .optional()
}

pub fn create_team(
    conn: &Connection,
    name: &str,
    grid_layout: &str,
    agents: &[AgentConfig],
) -> rusqlite::Result<Team> {
    let id = uuid::Uuid::new_v4().to_string();
    let agents_json = serde_json::to_string(agents)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    let chat_dir = chat_dir_for(name);

    conn.execute(
        "INSERT INTO teams (id, name, agents, grid_layout, chat_dir) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, name, agents_json, grid_layout, chat_dir],
    )?;

    // Read back so created_at reflects what SQLite stored.
    get_team(conn, &id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

pub fn update_team(
    conn: &Connection,
    id: &str,
    name: &str,
    grid_layout: &str,
    agents: &[AgentConfig],
) -> rusqlite::Result<Option<Team>> {
    let agents_json = serde_json::to_string(agents)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    let changed = conn.execute(
        "UPDATE teams SET name = ?2, agents = ?3, grid_layout = ?4, chat_dir = ?5 \
         WHERE id = ?1",
        params![id, name, agents_json, grid_layout, chat_dir_for(name)],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    get_team(conn, id)
}

pub fn delete_team(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute("DELETE FROM teams WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

/// Room directory name derived from the team name: lowercased, runs of
/// non-alphanumerics collapsed to single dashes.
fn chat_dir_for(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "team".to_string()
    } else {
        trimmed.to_string()
    }
}
