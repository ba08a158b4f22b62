mod action;
mod app;
mod app_state;
mod component;
mod components;
mod http;
mod theme;
mod widgets;
mod workspace;

use tokio::sync::mpsc;

use signs_proto::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = signs_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("signs.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to debug for app code but suppress noisy
    // connection-level DEBUG from HTTP client internals (hyper_util, reqwest).
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // The terminal belongs to the display; point the operator at the log.
    eprintln!("signs log: {}", log_path.display());

    tracing::info!("signs starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = Config::load()?;
    tracing::info!(
        server = %config.server.base_url,
        config = %Config::config_path().display(),
        "config loaded"
    );

    let clock = signs_proto::clock::from_override(config.clock.time_override.as_deref());

    // ── AppMessage channel (keyboard / fetch tasks / HTTP → App) ─────────────
    let (tx, rx) = mpsc::channel::<app::AppMessage>(1024);

    let app = app::App::new(config.clone(), clock, tx.clone())?;

    // ── HTTP server ──────────────────────────────────────────────────────────
    if config.http.enabled {
        http::start_server(
            config.http.bind_address.clone(),
            config.http.port,
            http::HttpState {
                status: app.status(),
                tx,
            },
            app.cancel_token().child_token(),
        );
    }

    // ── Run display ──────────────────────────────────────────────────────────
    app.run(rx).await?;

    tracing::info!("signs exiting");
    Ok(())
}
