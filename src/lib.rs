//! Root crate facade for the Sözlük API server and dictionary core.

pub use sozluk_core::{offline, search, sync, text};
pub use sozluk_server::{
    config, create_app, db, entry, error, handlers, models, resolve_bind_address, serve_router,
    AppError, AppState, Config, Database, SyncManager, SyncStatus, DEFAULT_PORT,
};
