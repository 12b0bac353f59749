use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use matinee_api::{
    config::Config,
    routes::create_router,
    services::{
        llm::{ChatCompleter, LlmClient},
        metadata::MetadataResolver,
        providers::{freetext::FreeTextProvider, tmdb::TmdbProvider, MetadataProvider},
    },
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("matinee_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let llm: Arc<dyn ChatCompleter> = Arc::new(LlmClient::new(
        config.llm_api_key.clone(),
        config.llm_api_url.clone(),
        config.llm_model.clone(),
    ));

    // Provider order is resolution priority: structured lookups first, the
    // model-backed fallback last.
    let providers: Vec<Arc<dyn MetadataProvider>> = vec![
        Arc::new(TmdbProvider::new(
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.watch_region.clone(),
        )),
        Arc::new(FreeTextProvider::new(llm.clone())),
    ];
    let resolver = Arc::new(MetadataResolver::new(providers));

    let state = AppState::new(config.rate_limits(), llm, resolver);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
