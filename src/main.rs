use log::info;
use sales_kit::backend::InMemoryStore;
use sales_kit::config::AppConfig;
use sales_kit::routes::{router, AppState};
use sales_kit::SalesService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;

    let store = match &config.snapshot_path {
        Some(path) => InMemoryStore::open(path.clone()).await?,
        None => {
            info!("SNAPSHOT_PATH not set, data lives in memory only");
            InMemoryStore::new()
        }
    };
    store.log_stats().await;

    let state = AppState::new(SalesService::new(store), config.page_sizes);
    let app = router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 sales-kit v{} listening on http://{}", sales_kit::VERSION, addr);

    axum::serve(listener, app).await?;
    Ok(())
}
