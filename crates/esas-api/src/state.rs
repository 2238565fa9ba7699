use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use esas_education::EducationCatalog;
use esas_recommendations::RecommendationTable;
use esas_storage::backend::StoreBackend;
use esas_storage::deadline::with_deadline;
use esas_storage::error::StorageError;

use crate::config::ApiConfig;
use crate::middleware::rate::RateLimiter;

/// Shared application state, injected into all route handlers via Axum state.
///
/// Everything is built once in `main` and read-only afterwards, apart from
/// the rate limiter's counters.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StoreBackend>,
    pub recommendations: Arc<RecommendationTable>,
    pub education: Arc<EducationCatalog>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
    pub storage_timeout: Duration,
    pub admin_accounts: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(
        config: &ApiConfig,
        store: StoreBackend,
        recommendations: RecommendationTable,
        education: EducationCatalog,
    ) -> Self {
        Self {
            store: Arc::new(store),
            recommendations: Arc::new(recommendations),
            education: Arc::new(education),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(config.rate_limit_per_minute))),
            storage_timeout: config.storage_timeout,
            admin_accounts: Arc::new(config.admin_accounts.clone()),
        }
    }

    pub fn store(&self) -> &StoreBackend {
        &self.store
    }

    /// Await a storage-backed operation within the configured timeout.
    pub async fn bounded<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<StorageError>,
    {
        with_deadline(self.storage_timeout, operation).await
    }
}
