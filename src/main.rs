//! Dispatch check-in server.

use std::sync::Arc;

use http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use dispatch_checkin::adapters::http::{api_router, CallHandlers, WebhookHandlers};
use dispatch_checkin::adapters::monitor::ObserverRegistry;
use dispatch_checkin::adapters::retell::{RetellClient, RetellConfig, RetellWebhookVerifier};
use dispatch_checkin::adapters::storage::{
    FileContextStore, InMemoryContextStore, PostgresContextStore,
};
use dispatch_checkin::application::{
    AnalyzeSpeechHandler, CallLocks, EndCallHandler, GetCallHandler, ProcessTurnHandler,
    StartCallHandler, TriggerCallHandler,
};
use dispatch_checkin::config::{AppConfig, StorageBackend};
use dispatch_checkin::ports::{CallControl, CallObserver, ContextStore, UnconfiguredCallControl};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let store = context_store(&config).await?;
    let registry = Arc::new(ObserverRegistry::new(config.monitor.channel_capacity));
    let observer: Arc<dyn CallObserver> = registry.clone();
    let call_control = call_control(&config)?;
    let locks = Arc::new(CallLocks::new());
    let default_scenario = config.engine.scenario();

    let mut webhooks = WebhookHandlers::new(
        Arc::new(StartCallHandler::new(store.clone(), observer.clone(), locks.clone())),
        Arc::new(ProcessTurnHandler::new(store.clone(), observer.clone(), locks.clone())),
        Arc::new(AnalyzeSpeechHandler::default()),
        Arc::new(EndCallHandler::new(store, observer.clone(), locks)),
        observer,
    )
    .with_default_scenario(default_scenario.clone());

    if let Some(key) = config.retell.webhook_signing_key() {
        webhooks = webhooks.with_verifier(RetellWebhookVerifier::new(key.clone()));
    }

    let calls = CallHandlers::new(
        Arc::new(TriggerCallHandler::new(
            call_control.clone(),
            config.retell.default_agent_id.clone(),
        )),
        Arc::new(GetCallHandler::new(call_control)),
        default_scenario.clone(),
    );

    let app = api_router(webhooks, calls, registry)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    tracing::info!(
        %addr,
        scenario = %default_scenario,
        storage = ?config.storage.backend,
        retell = config.retell.is_configured(),
        "Dispatch check-in server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_filter(filter))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_filter(filter))
            .init();
    }
}

async fn context_store(
    config: &AppConfig,
) -> Result<Arc<dyn ContextStore>, Box<dyn std::error::Error>> {
    let store: Arc<dyn ContextStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryContextStore::new()),
        StorageBackend::File => Arc::new(FileContextStore::new(&config.storage.directory)),
        StorageBackend::Postgres => {
            let url = config
                .storage
                .database_url
                .as_deref()
                .ok_or("storage.database_url is required for the postgres backend")?;
            let store = PostgresContextStore::connect(url, config.storage.max_connections).await?;
            store.migrate().await?;
            Arc::new(store)
        }
    };
    Ok(store)
}

fn call_control(config: &AppConfig) -> Result<Arc<dyn CallControl>, Box<dyn std::error::Error>> {
    let Some(api_key) = config.retell.api_key.clone() else {
        tracing::warn!("Retell API key not set; outbound calls are disabled");
        return Ok(Arc::new(UnconfiguredCallControl));
    };

    let retell = RetellConfig::new(api_key)
        .with_base_url(&config.retell.base_url)
        .with_timeout(config.retell.timeout())
        .with_from_number(config.retell.from_number.clone());
    Ok(Arc::new(RetellClient::new(retell)?))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    match config.server.allowed_origins() {
        Some(origins) => layer.allow_origin(
            origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect::<Vec<HeaderValue>>(),
        ),
        None => layer.allow_origin(Any),
    }
}
