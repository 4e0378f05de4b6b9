use db::DBService;

use crate::sessions::SessionStore;

pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod sessions;

#[derive(Clone)]
pub struct AppState {
    db: DBService,
    sessions: SessionStore,
}

impl AppState {
    pub fn new(db: DBService) -> Self {
        Self {
            db,
            sessions: SessionStore::default(),
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
