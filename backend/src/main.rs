//! Backend entry-point: loads settings, picks the storage adapters and serves
//! the marketplace API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use mockable::{DefaultClock, DefaultEnv};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use marketplace::domain::ports::{ImageStorage, NoopImageStorage, PersistenceGateway};
use marketplace::inbound::http::health::HealthState;
use marketplace::inbound::http::session_config::{BuildMode, KeySource, SessionSettings};
use marketplace::inbound::http::state::HttpState;
use marketplace::outbound::memory::MemoryGateway;
use marketplace::outbound::persistence::{DbPool, DieselGateway, PoolConfig, run_migrations};
use marketplace::outbound::security::BcryptPasswordHasher;
use marketplace::outbound::storage::CapImageStorage;
use ortho_config::OrthoConfig;

use server::{Adapters, MarketplaceSettings, ServerConfig, build_accounts, build_http_state};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = MarketplaceSettings::load().wrap_err("failed to load settings")?;
    let session = SessionSettings::from_env(&DefaultEnv::new(), BuildMode::current())
        .wrap_err("invalid session configuration")?;
    info!(
        fingerprint = %session.fingerprint(),
        ephemeral = session.key_source == KeySource::Ephemeral,
        "session key loaded"
    );

    let adapters = Adapters {
        storage: image_storage(&settings)?,
        hasher: Arc::new(BcryptPasswordHasher::default()),
        clock: Arc::new(DefaultClock),
        allowed_domains: settings.allowed_domains(),
    };

    let http_state = match settings.database_url.as_deref() {
        Some(url) => {
            run_migrations(url)
                .await
                .wrap_err("failed to apply database migrations")?;
            let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_size()))
                .await
                .wrap_err("failed to build database pool")?;
            info!(pool_size = settings.pool_size(), "using PostgreSQL persistence");
            prepare_state(Arc::new(DieselGateway::new(pool)), &adapters, &settings).await?
        }
        None => {
            warn!("MARKETPLACE_DATABASE_URL not set; data lives in memory only");
            prepare_state(
                Arc::new(MemoryGateway::with_default_categories()),
                &adapters,
                &settings,
            )
            .await?
        }
    };

    let bind_addr = settings.bind_addr()?;
    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    );
    let server = server::create_server(health_state, http_state, config)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "marketplace listening");
    server.await?;
    Ok(())
}

fn image_storage(settings: &MarketplaceSettings) -> Result<Arc<dyn ImageStorage>> {
    match &settings.image_root {
        Some(root) => {
            let storage = CapImageStorage::open(root)
                .wrap_err_with(|| format!("failed to open image root {}", root.display()))?;
            Ok(Arc::new(storage))
        }
        None => {
            warn!("MARKETPLACE_IMAGE_ROOT not set; image files are never deleted");
            Ok(Arc::new(NoopImageStorage))
        }
    }
}

/// Bootstrap the configured administrator, then build the HTTP state.
async fn prepare_state<G>(
    gateway: Arc<G>,
    adapters: &Adapters,
    settings: &MarketplaceSettings,
) -> Result<web::Data<HttpState>>
where
    G: PersistenceGateway + 'static,
{
    let accounts = build_accounts(&gateway, adapters);
    if let Some(registration) = settings.admin_registration()? {
        let email = registration.email().to_string();
        let created = accounts
            .ensure_admin(registration)
            .await
            .wrap_err("failed to bootstrap administrator")?;
        info!(%email, created, "bootstrap administrator checked");
    }
    Ok(build_http_state(gateway, accounts, adapters))
}
