use rusqlite::{params, Connection, OptionalExtension};

pub fn get(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM settings WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, key: &str) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM settings WHERE key = ?1", params![key])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_delete() {
        let conn = crate::open_in_memory().unwrap();

        assert!(get(&conn, "active_team").unwrap().is_none());
        set(&conn, "active_team", "t1").unwrap();
        assert_eq!(get(&conn, "active_team").unwrap().as_deref(), Some("t1"));

        // Upsert replaces.
        set(&conn, "active_team", "t2").unwrap();
        assert_eq!(get(&conn, "active_team").unwrap().as_deref(), Some("t2"));

        delete(&conn, "active_team").unwrap();
        assert!(get(&conn, "active_team").unwrap().is_none());
    }
}
