use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod config;
mod credentials;
mod error;
mod middleware;
mod repositories;
mod routes;
mod scan;
mod tokens;
mod validation;

use mess::credential::CredentialCodec;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::config::ScannerConfig;
use crate::credentials::CredentialService;
use crate::repositories::{
    CutRepository, MemberRepository, PaymentRepository, ScanEventRepository, SettingsRepository,
    StaffTokenRepository,
};
use crate::scan::ScanService;
use crate::tokens::TokenStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: ScannerConfig,
    pub token_store: TokenStore,
    pub scan_service: ScanService,
    pub credential_service: CredentialService,
    pub members: MemberRepository,
    pub payments: PaymentRepository,
    pub cuts: CutRepository,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting scanner service");

    let config = ScannerConfig::from_env()?;

    // Initialize database connection pool
    let db_config = common::database::DatabaseConfig::from_env()?;
    let pool = common::database::init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let members = MemberRepository::new(pool.clone());
    let payments = PaymentRepository::new(pool.clone());
    let cuts = CutRepository::new(pool.clone());
    let scans = ScanEventRepository::new(pool.clone());
    let settings = SettingsRepository::new(pool.clone());
    let staff_tokens = StaffTokenRepository::new(pool.clone());

    // Make sure the secret epoch row exists before the first scan
    settings.ensure_defaults().await?;

    let codec = CredentialCodec::new(config.qr_secret.clone());
    let token_store = TokenStore::new(staff_tokens);
    let scan_service = ScanService::new(
        members.clone(),
        payments.clone(),
        cuts.clone(),
        scans,
        settings.clone(),
        codec.clone(),
        config.timezone,
    );
    let credential_service = CredentialService::new(members.clone(), settings, codec);

    info!("Scanner service initialized successfully");

    let app_state = AppState {
        db_pool: pool,
        config: config.clone(),
        token_store,
        scan_service,
        credential_service,
        members,
        payments,
        cuts,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Scanner service listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
