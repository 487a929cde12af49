use anyhow::Context;
use chorus_config::ChorusConfig;
use chorus_db::service::CatalogService;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: CatalogService,
    pub config: ChorusConfig,
}

impl AppContext {
    /// Open the configured catalog database and run migrations.
    pub async fn init(config: ChorusConfig) -> anyhow::Result<Self> {
        let service = CatalogService::new_local(&config.database.path)
            .await
            .with_context(|| format!("failed to open database '{}'", config.database.path))?;
        tracing::debug!(path = %config.database.path, "catalog database ready");
        Ok(Self { service, config })
    }
}

#[cfg(test)]
pub async fn test_context() -> AppContext {
    let mut config = ChorusConfig::default();
    config.database.path = ":memory:".to_string();
    AppContext::init(config).await.expect("in-memory context")
}
