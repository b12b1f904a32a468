use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod config;
mod dir;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Blocking directory reads run on the blocking pool; workers only drive sockets
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("[Config] Using {workers} worker threads"));
    } else {
        logger::log_info("[Config] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(
    cfg: config::Config,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let state = Arc::new(config::AppState::new(&cfg));
    let active_connections = Arc::new(AtomicUsize::new(0));

    server::signal::start_signal_handler(Arc::clone(&state))?;
    logger::log_server_start(&addr, &cfg);

    server::start_server_loop(listener, state, active_connections).await
}
