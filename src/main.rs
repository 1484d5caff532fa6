//! Ergo Intake API server.

use std::error::Error;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ergo_intake::adapters::ai::{MockLanguageModel, OpenAIConfig, OpenAIProvider};
use ergo_intake::adapters::http::{build_router, ChatAppState, KnowledgeHandlers};
use ergo_intake::adapters::narrative::{
    LlmIntakeExtractor, LlmNarrator, ScriptedIntakeExtractor, TemplateNarrator,
};
use ergo_intake::adapters::retrieval::{ChromaRetriever, StaticRetriever};
use ergo_intake::application::{
    AnswerQueryHandler, ChunkCatalogHandler, HandleTurnHandler, IngestDocumentHandler,
    RetrieveSourcesHandler,
};
use ergo_intake::config::{AiProvider, AppConfig, ConfigError, RetrievalProvider, ServerConfig};
use ergo_intake::domain::conversation::TurnOrchestrator;
use ergo_intake::domain::risk::{RiskCalculator, RiskModel};
use ergo_intake::ports::{
    DocumentStore, IntakeExtractor, LanguageModel, NarrativeGenerator, SolutionRetriever,
};

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.server);

    if let Err(err) = run(config).await {
        tracing::error!(error = %err, "server exited with error");
        std::process::exit(1);
    }
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn run(config: AppConfig) -> Result<(), BoxError> {
    config.validate().map_err(ConfigError::from)?;

    let risk_model = config.risk.model().map_err(ConfigError::from)?;
    let (state, knowledge) = build_state(&config, risk_model).await?;
    let app = build_router(
        state,
        knowledge,
        &config.server.cors_origins_list(),
        config.server.request_timeout(),
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        ai = ?config.ai.provider,
        retrieval = ?config.retrieval.provider,
        target_z = risk_model.target_z,
        "Ergo intake API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Wires the adapters selected by configuration into the HTTP state.
async fn build_state(
    config: &AppConfig,
    risk_model: RiskModel,
) -> Result<(ChatAppState, KnowledgeHandlers), BoxError> {
    let (model, extractor, narrator): (
        Arc<dyn LanguageModel>,
        Arc<dyn IntakeExtractor>,
        Arc<dyn NarrativeGenerator>,
    ) = match config.ai.provider {
        AiProvider::OpenAI => {
            let api_key = config
                .ai
                .openai_api_key
                .clone()
                .ok_or(ergo_intake::config::ValidationError::MissingRequired("OPENAI_API_KEY"))?;
            let provider = OpenAIProvider::new(
                OpenAIConfig::from_secret(api_key)
                    .with_chat_model(&config.ai.chat_model)
                    .with_embedding_model(&config.ai.embedding_model)
                    .with_base_url(&config.ai.base_url)
                    .with_timeout(config.ai.timeout()),
            )?;
            let model: Arc<dyn LanguageModel> = Arc::new(provider);
            (
                model.clone(),
                Arc::new(LlmIntakeExtractor::new(model.clone())),
                Arc::new(LlmNarrator::new(model)),
            )
        }
        AiProvider::Mock => {
            tracing::warn!("mock AI provider selected; replies are templated");
            (
                Arc::new(MockLanguageModel::new()),
                Arc::new(ScriptedIntakeExtractor::default()),
                Arc::new(TemplateNarrator),
            )
        }
    };

    let (retriever, store): (Arc<dyn SolutionRetriever>, Arc<dyn DocumentStore>) =
        match config.retrieval.provider {
            RetrievalProvider::Chroma => {
                let chroma = Arc::new(ChromaRetriever::new(config.retrieval.chroma(), model.clone())?);
                if let Err(err) = chroma.heartbeat().await {
                    tracing::warn!(error = %err, url = %config.retrieval.chroma_url, "Chroma not reachable at startup");
                }
                let store: Arc<dyn DocumentStore> = chroma.clone();
                let retriever: Arc<dyn SolutionRetriever> = chroma;
                (retriever, store)
            }
            RetrievalProvider::Static => {
                tracing::warn!("static retriever selected; solution store starts empty");
                let memory = Arc::new(StaticRetriever::default());
                let store: Arc<dyn DocumentStore> = memory.clone();
                let retriever: Arc<dyn SolutionRetriever> = memory;
                (retriever, store)
            }
        };

    let orchestrator = TurnOrchestrator::new(RiskCalculator::new(risk_model))
        .with_top_k(config.retrieval.top_k);
    let turn_handler = HandleTurnHandler::new(extractor, retriever.clone(), narrator)
        .with_orchestrator(orchestrator);

    let knowledge = KnowledgeHandlers::new(
        IngestDocumentHandler::new(model.clone(), store.clone())
            .with_splitter(config.retrieval.splitter()?),
        ChunkCatalogHandler::new(store),
        AnswerQueryHandler::new(retriever.clone(), model),
    );

    Ok((
        ChatAppState::new(turn_handler, RetrieveSourcesHandler::new(retriever)),
        knowledge,
    ))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
