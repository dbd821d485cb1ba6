//! support-relay server binary.
//!
//! Loads configuration, wires the oracle/store/dispatch adapters into the
//! inbound orchestrator, and serves the Messenger webhook.

use std::error::Error;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use support_relay::adapters::ai::{
    GeminiCompletenessOracle, GeminiConfig, OpenAiClassificationOracle, OpenAiConfig,
};
use support_relay::adapters::http::webhook::SignatureVerifier;
use support_relay::adapters::http::{webhook_router, WebhookAppState};
use support_relay::adapters::messenger::{GraphApiConfig, GraphApiDispatcher};
use support_relay::adapters::store::{
    InMemoryKnowledgeStore, InMemoryTurnRecorder, PostgresKnowledgeStore, PostgresTurnRecorder,
};
use support_relay::application::{InboundMessageHandler, RecorderQueue};
use support_relay::config::AppConfig;
use support_relay::domain::answer::AnswerResolver;
use support_relay::domain::classification::{CategoryCatalogCache, ClassificationPipeline};
use support_relay::domain::history::HistoryStore;
use support_relay::ports::{KnowledgeStore, ReplyDispatcher, TurnRecorder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    // File logging needs its guard alive for the process lifetime.
    let _log_guard = init_tracing(&config);

    let (knowledge_store, turn_recorder) = build_stores(&config).await?;

    let completeness = Arc::new(GeminiCompletenessOracle::new(
        GeminiConfig::new(config.ai.gemini_api_key.clone().unwrap_or_default())
            .with_model(config.ai.gemini_model.clone())
            .with_timeout(config.ai.completeness_timeout()),
    )?);
    let classifier = Arc::new(OpenAiClassificationOracle::new(
        OpenAiConfig::new(config.ai.openai_api_key.clone().unwrap_or_default())
            .with_model(config.ai.openai_model.clone())
            .with_timeout(config.ai.classification_timeout()),
    )?);

    let dispatcher: Arc<dyn ReplyDispatcher> = Arc::new(GraphApiDispatcher::new(
        GraphApiConfig::new(config.messenger.page_access_token())
            .with_base_url(config.messenger.graph_base_url.clone()),
    )?);

    let catalog = Arc::new(CategoryCatalogCache::new(knowledge_store.clone()));
    let pipeline = ClassificationPipeline::new(classifier, catalog);
    let resolver = AnswerResolver::new(knowledge_store);
    let recorder = RecorderQueue::spawn(turn_recorder);

    let handler = Arc::new(
        InboundMessageHandler::new(
            completeness,
            pipeline,
            resolver,
            Arc::new(HistoryStore::new()),
            dispatcher,
            recorder,
        )
        .with_timeout(config.dialogue.timeout()),
    );

    let state = WebhookAppState {
        handler,
        verify_token: config.messenger.verify_token.clone(),
        signature: config
            .messenger
            .app_secret()
            .map(|secret| Arc::new(SignatureVerifier::new(secret))),
    };

    let app = webhook_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let addr = config.server.socket_addr()?;
    info!(%addr, "support-relay listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initializes console and optional rolling-file logging.
fn init_tracing(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    match &config.server.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "support-relay.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

/// Builds the knowledge store and turn recorder, Postgres-backed when a
/// database URL is configured, in-memory otherwise.
async fn build_stores(
    config: &AppConfig,
) -> Result<(Arc<dyn KnowledgeStore>, Arc<dyn TurnRecorder>), Box<dyn Error>> {
    if let Some(url) = config.database.url.as_deref().filter(|u| !u.is_empty()) {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(config.database.acquire_timeout())
            .connect(url)
            .await?;

        if config.database.run_migrations {
            sqlx::migrate!("./migrations").run(&pool).await?;
        }

        info!("using Postgres knowledge store and turn recorder");
        Ok((
            Arc::new(PostgresKnowledgeStore::new(pool.clone())),
            Arc::new(PostgresTurnRecorder::new(pool)),
        ))
    } else {
        info!("no database configured; using in-memory stores");
        Ok((
            Arc::new(InMemoryKnowledgeStore::new()),
            Arc::new(InMemoryTurnRecorder::new()),
        ))
    }
}
