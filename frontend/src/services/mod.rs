pub mod api;
pub mod dialog;
pub mod logging;
pub mod query_cache;
