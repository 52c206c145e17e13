use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use seo_blog_generator::{
    config::Config,
    api::routes::create_router,
    llm::ChatCompletionsClient,
    pipeline::Pipeline,
    scheduler::start_daily_job,
    scraper::{CompetitorScraper, HttpPageFetcher},
    search::SerpApiClient,
    AppState,
};

// The HTTP clients are blocking, so they are built before the tokio runtime
// starts and only ever used from the scheduler thread or `spawn_blocking`.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={level},tower_http={level}",
                env!("CARGO_CRATE_NAME"),
                level = config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SEO blog generator v{}", env!("CARGO_PKG_VERSION"));

    let search = SerpApiClient::new(
        config.serpapi_api_key.clone(),
        config.search_country.clone(),
        config.search_language.clone(),
    )?;
    let scraper = CompetitorScraper::new(Box::new(HttpPageFetcher::new()?), config.competitor_pages);
    let generator = ChatCompletionsClient::new(
        config.llm_api_url.clone(),
        config.llm_api_key.clone(),
        config.llm_model.clone(),
    )?;
    info!(model = config.llm_model.as_str(), competitor_pages = config.competitor_pages, "Pipeline initialized");

    let pipeline = Arc::new(Pipeline::new(Box::new(search), scraper, Box::new(generator)));

    if config.scheduler_enabled {
        start_daily_job(Arc::clone(&pipeline), config.schedule.clone())?;
    } else {
        info!("Scheduler disabled");
    }

    // Create application state
    let app_state = AppState { pipeline };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config.server_addr, app_state))
}

async fn serve(server_addr: SocketAddr, app_state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    // Build the router with routes
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    info!("Listening on http://{}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
