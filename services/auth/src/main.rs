use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use auth::{
    AppState,
    mailer::{MailConfig, Mailer},
    repositories::{ResetTokenRepository, UserRepository},
    routes,
    settings::Settings,
};
use common::{
    database::{DatabaseConfig, health_check, init_pool},
    http::Authenticator,
    jwt::{JwtConfig, TokenService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting authentication service");

    let settings = Settings::load()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize token service
    let jwt_config = JwtConfig::from_env()?;
    let tokens = TokenService::new(jwt_config);

    let app_state = AppState {
        users: UserRepository::new(pool.clone()),
        reset_tokens: ResetTokenRepository::new(pool.clone()),
        authenticator: Authenticator::new(pool.clone(), tokens),
        mailer: Mailer::from_config(MailConfig::from_env()),
        settings: settings.clone(),
        pool,
    };

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Authentication service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
