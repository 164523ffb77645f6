pub mod error;
pub mod messages;

use std::sync::Arc;

use postbox_db::Database;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}
