use agent::config::{self, AgentConfig};
use agent::hooks::AgentHooks;
use agent::modules::build_modules;
use agent::{build_router, AppState};
use anyhow::Result;
use lifecycle::{create_platform, ModuleScheduler, PowerOrchestrator, PowerState};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("agent=info".parse()?)
        .add_directive("lifecycle=info".parse()?)
        .add_directive("tower_http=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting Host Agent v{}", env!("CARGO_PKG_VERSION"));

    let config_path =
        std::env::var("AGENT_CONFIG").unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());
    let config = Arc::new(AgentConfig::load(&config_path).await?);

    let (api_key, is_default) =
        config::select_api_key(std::env::var("AGENT_API_KEY").ok(), config.api_key.as_deref());
    if is_default {
        warn!("Using default development API key - set AGENT_API_KEY environment variable for production");
    }

    let state = Arc::new(PowerState::new());
    let orchestrator = Arc::new(PowerOrchestrator::new(create_platform(), state.clone()));
    info!("Power orchestrator initialized");

    let modules = build_modules(&config.scheduler.modules, &orchestrator);
    let hooks = Arc::new(AgentHooks::new(config.clone()));
    let scheduler = ModuleScheduler::new(config.service_name.clone(), modules, hooks, state);

    // Without a server address the loop stays down but the control API still runs
    if let Err(e) = scheduler.start().await {
        error!("Scheduler not started: {}", e);
    }

    let app = build_router(Arc::new(AppState {
        api_key,
        orchestrator,
    }));

    let listen = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("Agent control API listening on {}", listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop().await;
    info!("Host Agent stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
