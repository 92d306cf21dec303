/// Application context and dependency injection
use crate::{
    account::AccountManager,
    config::ServerConfig,
    consent::ConsentManager,
    db,
    documents::DocumentStore,
    error::PortalResult,
    import::{BulkImporter, ImportDefaults},
    mailer::{Mailer, Notifier},
    profile::ProfileStore,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub account_manager: Arc<AccountManager>,
    pub profile_store: Arc<ProfileStore>,
    pub document_store: Arc<DocumentStore>,
    pub consent_manager: Arc<ConsentManager>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> PortalResult<Self> {
        config.validate()?;

        // Create data directories if they don't exist
        Self::ensure_directories(&config).await?;

        let db = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        let mailer = Mailer::new(config.email.clone(), &config.service.public_url)?;
        if !mailer.is_configured() {
            tracing::warn!("SMTP not configured; account notifications will be logged and skipped");
        }

        let ctx = Self::with_pool(config, db, Arc::new(mailer));
        ctx.bootstrap_admin().await?;

        Ok(ctx)
    }

    /// Wire services around an existing pool and notifier
    pub fn with_pool(config: ServerConfig, db: SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        let config = Arc::new(config);

        let account_manager = Arc::new(AccountManager::new(db.clone(), config.clone()));
        let profile_store = Arc::new(ProfileStore::new(db.clone()));
        let document_store = Arc::new(DocumentStore::new(
            db.clone(),
            config.storage.uploads_directory.clone(),
            config.service.upload_limit,
        ));
        let consent_manager = Arc::new(ConsentManager::new(db.clone()));

        Self {
            config,
            db,
            account_manager,
            profile_store,
            document_store,
            consent_manager,
            notifier,
        }
    }

    /// Importer bound to this context's issuer, notifier and defaults
    pub fn bulk_importer(&self) -> BulkImporter {
        BulkImporter::new(
            self.account_manager.clone(),
            self.notifier.clone(),
            ImportDefaults::from(&self.config.import),
        )
    }

    /// Create the configured admin account if no active admin exists
    pub async fn bootstrap_admin(&self) -> PortalResult<()> {
        match &self.config.authentication.bootstrap_admin {
            Some(admin) => {
                self.account_manager.ensure_bootstrap_admin(admin).await?;
            }
            None => {
                if self.account_manager.count_active(crate::account::Role::Admin).await? == 0 {
                    tracing::warn!("No active admin account and no bootstrap admin configured");
                }
            }
        }

        Ok(())
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> PortalResult<()> {
        let dirs = [
            &config.storage.data_directory,
            &config.storage.uploads_directory,
        ];

        for dir in dirs {
            tokio::fs::create_dir_all(dir).await?;
        }

        Ok(())
    }
}
