// Application state module
// Shared, read-only state handed to every connection

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::dir::DirService;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Directory endpoint, shared with blocking worker threads
    pub dir_service: Arc<DirService>,
    /// Wakes the server loop for graceful shutdown
    pub shutdown_signal: Arc<Notify>,
    pub shutdown_requested: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            dir_service: Arc::new(DirService::from_config(&config.dir)),
            shutdown_signal: Arc::new(Notify::new()),
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }
}
