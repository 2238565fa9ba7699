use std::env;
use std::net::SocketAddr;

use esas_api::config::{ApiConfig, StorageConfig};
use esas_api::state::AppState;
use esas_education::EducationCatalog;
use esas_recommendations::RecommendationTable;
use esas_storage::backend::StoreBackend;
use esas_storage::memory::MemoryObjectStore;
use esas_storage::s3::{S3ObjectStore, build_client};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging for CloudWatch
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = ApiConfig::from_env()?;

    // A missing recommendation would only surface mid-request, so refuse
    // to start instead.
    let recommendations = match &config.recommendations_path {
        Some(path) => RecommendationTable::from_path(path)?,
        None => RecommendationTable::builtin()?,
    };
    let education = match &config.education_path {
        Some(path) => EducationCatalog::from_path(path)?,
        None => EducationCatalog::builtin()?,
    };

    let store = match &config.storage {
        StorageConfig::S3 { bucket } => {
            let s3 = S3ObjectStore::new(build_client().await, bucket.clone());
            tracing::info!(bucket = s3.bucket(), "using S3 storage");
            StoreBackend::S3(s3)
        }
        StorageConfig::Memory => {
            tracing::warn!("using in-memory storage; data is lost on exit");
            StoreBackend::Memory(MemoryObjectStore::new())
        }
    };

    tracing::info!(
        storage = store.name(),
        recommendation_table_version = recommendations.version(),
        education_catalog_version = education.version(),
        "starting esas-api"
    );

    let state = AppState::new(&config, store, recommendations, education);
    let app = esas_api::router(state);

    if env::var_os("AWS_LAMBDA_RUNTIME_API").is_some() {
        lambda_http::run(app).await.map_err(|e| eyre::eyre!(e))
    } else {
        let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
        tracing::info!(addr = %config.bind_addr, "listening");
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(())
    }
}
