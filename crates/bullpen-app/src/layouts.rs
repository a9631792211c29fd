//! Freeform layout state: in-memory cache over the durable store.
//!
//! Persisted layouts are read once at startup; every settled mutation
//! (drag/resize commit or membership-driven sync) writes through — unless
//! the canonical signature is unchanged, in which case the write is
//! skipped so re-renders that don't move anything cause no I/O.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bullpen_layout::freeform;
use bullpen_layout::LayoutItem;
use rusqlite::Connection;

pub struct LayoutTracker {
    db: Arc<Mutex<Connection>>,
    cache: Mutex<HashMap<String, Vec<LayoutItem>>>,
}

impl LayoutTracker {
    /// Build the tracker and load every persisted layout.
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        let mut cache = HashMap::new();
        {
            let conn = db.lock().expect("db lock poisoned");
            match bullpen_db::layouts::list_all(&conn) {
                Ok(rows) => {
                    for (team_id, items) in rows {
                        cache.insert(team_id, items);
                    }
                }
                Err(e) => log::warn!("failed to load persisted layouts: {e}"),
            }
        }

        Self {
            db,
            cache: Mutex::new(cache),
        }
    }

    /// Reconcile a team's layout with its live session set and return it.
    pub fn sync_team(&self, team_id: &str, live: &[String]) -> Vec<LayoutItem> {
        let current = self.snapshot(team_id);
        let next = freeform::sync(&current, live);
        self.store_if_changed(team_id, &current, next)
    }

    /// Commit an explicit drag/resize mutation. The incoming items are
    /// normalized and reconciled against the live set before storing, so
    /// out-of-range geometry is recovered rather than rejected.
    pub fn commit(
        &self,
        team_id: &str,
        items: &[LayoutItem],
        live: &[String],
    ) -> Vec<LayoutItem> {
        let current = self.snapshot(team_id);
        let next = freeform::sync(items, live);
        self.store_if_changed(team_id, &current, next)
    }

    /// Drop a removed session's item, persisting if anything changed.
    pub fn prune_session(&self, team_id: &str, session_id: &str) {
        let current = self.snapshot(team_id);
        if !current.iter().any(|i| i.session_id == session_id) {
            return;
        }
        let next: Vec<LayoutItem> = current
            .iter()
            .filter(|i| i.session_id != session_id)
            .cloned()
            .collect();
        self.store_if_changed(team_id, &current, next);
    }

    /// Follow a session identity re-keyed by a restart, keeping its
    /// rectangle in place.
    pub fn rekey(&self, team_id: &str, old_id: &str, new_id: &str) {
        let current = self.snapshot(team_id);
        if !current.iter().any(|i| i.session_id == old_id) {
            return;
        }
        let next: Vec<LayoutItem> = current
            .iter()
            .map(|i| {
                if i.session_id == old_id {
                    let mut moved = i.clone();
                    moved.session_id = new_id.to_string();
                    moved
                } else {
                    i.clone()
                }
            })
            .collect();
        self.store_if_changed(team_id, &current, next);
    }

    /// Forget a team entirely (team deletion).
    pub fn drop_team(&self, team_id: &str) {
        self.cache
            .lock()
            .expect("layout cache poisoned")
            .remove(team_id);

        let conn = self.db.lock().expect("db lock poisoned");
        if let Err(e) = bullpen_db::layouts::delete(&conn, team_id) {
            log::warn!("failed to delete persisted layout for team {team_id}: {e}");
        }
    }

    /// Current cached layout, as-is (no sync).
    pub fn snapshot(&self, team_id: &str) -> Vec<LayoutItem> {
        self.cache
            .lock()
            .expect("layout cache poisoned")
            .get(team_id)
            .cloned()
            .unwrap_or_default()
    }

    fn store_if_changed(
        &self,
        team_id: &str,
        current: &[LayoutItem],
        next: Vec<LayoutItem>,
    ) -> Vec<LayoutItem> {
        if freeform::signature(current) == freeform::signature(&next) {
            return next;
        }

        self.cache
            .lock()
            .expect("layout cache poisoned")
            .insert(team_id.to_string(), next.clone());

        let conn = self.db.lock().expect("db lock poisoned");
        if let Err(e) = bullpen_db::layouts::set(&conn, team_id, &next) {
            log::warn!("failed to persist layout for team {team_id}: {e}");
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bullpen_layout::freeform::{DEFAULT_H, DEFAULT_W, MIN_H, MIN_W};

    fn tracker() -> LayoutTracker {
        let conn = bullpen_db::open_in_memory().unwrap();
        LayoutTracker::new(Arc::new(Mutex::new(conn)))
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn persisted(tracker: &LayoutTracker, team_id: &str) -> Option<Vec<LayoutItem>> {
        let conn = tracker.db.lock().unwrap();
        bullpen_db::layouts::get(&conn, team_id).unwrap()
    }

    #[test]
    fn test_sync_synthesizes_and_persists() {
        let tracker = tracker();
        let items = tracker.sync_team("t1", &ids(&["a", "b"]));

        assert_eq!(items.len(), 2);
        assert_eq!((items[0].x, items[0].y), (0, 0));
        assert_eq!((items[1].x, items[1].y), (DEFAULT_W, 0));
        assert_eq!(persisted(&tracker, "t1").unwrap(), items);
    }

    #[test]
    fn test_sync_without_change_skips_write() {
        let tracker = tracker();
        tracker.sync_team("t1", &ids(&["a"]));

        // Make the persisted row detectably different from what a second
        // write would produce; an unchanged sync must not touch it.
        {
            let conn = tracker.db.lock().unwrap();
            conn.execute("UPDATE layouts SET items = 'sentinel' WHERE team_id = 't1'", [])
                .unwrap();
        }

        tracker.sync_team("t1", &ids(&["a"]));

        let conn = tracker.db.lock().unwrap();
        let raw: String = conn
            .query_row("SELECT items FROM layouts WHERE team_id = 't1'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(raw, "sentinel", "idempotent sync must not rewrite");
    }

    #[test]
    fn test_commit_normalizes_and_stores() {
        let tracker = tracker();
        tracker.sync_team("t1", &ids(&["a"]));

        let wild = vec![LayoutItem {
            session_id: "a".to_string(),
            x: 50,
            y: 2,
            w: 40,
            h: 1,
            min_w: MIN_W,
            min_h: MIN_H,
        }];
        let committed = tracker.commit("t1", &wild, &ids(&["a"]));

        assert_eq!(committed.len(), 1);
        let item = &committed[0];
        assert!(item.w <= bullpen_layout::freeform::TOTAL_COLUMNS);
        assert!(item.x + item.w <= bullpen_layout::freeform::TOTAL_COLUMNS);
        assert!(item.h >= MIN_H);
        assert_eq!(persisted(&tracker, "t1").unwrap(), committed);
    }

    #[test]
    fn test_commit_prunes_dead_sessions() {
        let tracker = tracker();
        let items = tracker.sync_team("t1", &ids(&["a", "b"]));

        // "b" died between the drag and the commit.
        let committed = tracker.commit("t1", &items, &ids(&["a"]));
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].session_id, "a");
    }

    #[test]
    fn test_prune_session() {
        let tracker = tracker();
        tracker.sync_team("t1", &ids(&["a", "b"]));

        tracker.prune_session("t1", "a");
        let left = tracker.snapshot("t1");
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].session_id, "b");
        assert_eq!(persisted(&tracker, "t1").unwrap(), left);

        // Unknown session: no-op.
        tracker.prune_session("t1", "ghost");
        assert_eq!(tracker.snapshot("t1").len(), 1);
    }

    #[test]
    fn test_rekey_keeps_rectangle() {
        let tracker = tracker();
        let before = tracker.sync_team("t1", &ids(&["a", "b"]));

        tracker.rekey("t1", "a", "a2");
        let after = tracker.snapshot("t1");
        assert_eq!(after[0].session_id, "a2");
        assert_eq!((after[0].x, after[0].y), (before[0].x, before[0].y));
        assert_eq!(after[1], before[1]);
    }

    #[test]
    fn test_drop_team() {
        let tracker = tracker();
        tracker.sync_team("t1", &ids(&["a"]));

        tracker.drop_team("t1");
        assert!(tracker.snapshot("t1").is_empty());
        assert!(persisted(&tracker, "t1").is_none());
    }

    #[test]
    fn test_startup_load_reads_persisted_layouts() {
        let conn = bullpen_db::open_in_memory().unwrap();
        let db = Arc::new(Mutex::new(conn));

        {
            let first = LayoutTracker::new(Arc::clone(&db));
            first.sync_team("t1", &ids(&["a"]));
        }

        // A fresh tracker over the same database sees the stored layout.
        let second = LayoutTracker::new(Arc::clone(&db));
        let items = second.snapshot("t1");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].session_id, "a");
        assert_eq!((items[0].w, items[0].h), (DEFAULT_W, DEFAULT_H));
    }
}
