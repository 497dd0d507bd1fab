use anyhow::{Context, Result};
use downlink::api::{
    create_history_router, create_realtime_router, HistoryAppState, RealtimeAppState,
};
use downlink::broker::Broker;
use downlink::config::{self, SourceKind};
use downlink::history::{HistoryLedger, RangeResolver};
use downlink::scheduler::Sampler;
use downlink::source::{HttpValueSource, SimSource, ValueSource};
use downlink::state::StateStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "downlink=info".into()),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "downlink.toml".to_string());
    let config = config::load_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;

    info!(
        entities = config.entities.len(),
        fields = config.fields.len(),
        "Downlink starting"
    );

    let source: Arc<dyn ValueSource> = match config.source.kind {
        SourceKind::Http => Arc::new(HttpValueSource::new(
            config.source.url.clone(),
            Duration::from_millis(config.source.timeout_ms),
        )?),
        SourceKind::Sim => {
            let mut sim = SimSource::new();
            for field in &config.fields {
                for key in field.state_keys() {
                    sim = sim.with_field(key, field.default.clone());
                }
            }
            Arc::new(sim)
        }
    };

    let store = Arc::new(StateStore::new(
        Arc::clone(&source),
        &config.entities,
        &config.fields,
    ));
    let ledger = Arc::new(HistoryLedger::new());
    let broker = Arc::new(Broker::new(config.sampling.subscriber_queue_depth));

    let sampler = Arc::new(Sampler::new(
        Arc::clone(&store),
        Arc::clone(&ledger),
        Arc::clone(&broker),
        config.entities.clone(),
        config.tick_interval(),
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sampler_task = tokio::spawn(Arc::clone(&sampler).run(shutdown_rx));

    let history_state = Arc::new(HistoryAppState {
        ledger: Arc::clone(&ledger),
        resolver: RangeResolver::new(Arc::clone(&source), &config.entities),
        backend: config.sampling.history_backend,
    });
    let realtime_state = Arc::new(RealtimeAppState {
        broker: Arc::clone(&broker),
    });

    let app = create_history_router(history_state)
        .merge(create_realtime_router(realtime_state))
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "Serving history and realtime surfaces");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Server error")?;

    // Stop future ticks; in-flight appends complete atomically.
    let _ = shutdown_tx.send(true);
    let _ = sampler_task.await;

    Ok(())
}
