//! Application state shared by the command layer and the per-session tasks.

use std::sync::{Arc, Mutex};

use bullpen_host::ProcessHost;
use rusqlite::Connection;

use crate::coalescer::ResizeCoalescer;
use crate::feed::FeedAggregator;
use crate::focus::FocusTracker;
use crate::layouts::LayoutTracker;
use crate::multiplexer::EventMultiplexer;
use crate::registry::SessionRegistry;

/// Root of the orchestration core. Every component is constructed here and
/// reached only through this struct — no ambient state anywhere.
pub struct AppState {
    /// The external process host everything talks through.
    pub host: Arc<dyn ProcessHost>,
    /// Durable store (teams, layouts, settings).
    pub db: Arc<Mutex<Connection>>,
    pub registry: SessionRegistry,
    pub mux: EventMultiplexer,
    pub resizer: ResizeCoalescer,
    pub focus: FocusTracker,
    pub feed: FeedAggregator,
    pub layouts: LayoutTracker,
    /// The one team whose sessions are currently visible.
    pub active_team: Mutex<Option<String>>,
}

impl AppState {
    pub fn new(host: Arc<dyn ProcessHost>, db: Connection) -> Self {
        let db = Arc::new(Mutex::new(db));

        Self {
            registry: SessionRegistry::new(Arc::clone(&host)),
            mux: EventMultiplexer::new(Arc::clone(&host)),
            resizer: ResizeCoalescer::new(Arc::clone(&host)),
            focus: FocusTracker::new(),
            feed: FeedAggregator::new(),
            layouts: LayoutTracker::new(Arc::clone(&db)),
            active_team: Mutex::new(None),
            host,
            db,
        }
    }
}
