use std::net::SocketAddr;
use tokio::net::TcpListener;

use blog_server::config::{generate_config_template, Config};
use blog_server::{admin, auth, db, routes, state};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("blog_server=info"))?;
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().pretty().with_env_filter(env_filter).init();
    }

    tracing::info!("Blog server v{} starting", env!("CARGO_PKG_VERSION"));

    let db = db::init_db(&config.data_dir)?;
    let jwt_secret = auth::jwt::load_or_generate_jwt_secret(&config.data_dir)?;

    match admin::setup::maybe_generate_setup_token(&db)? {
        Some(token) => {
            tracing::info!("==========================================================");
            tracing::info!("  FIRST BOOT: No users registered yet.");
            tracing::info!("  Setup token: {}", token);
            tracing::info!("  Sign up with this token as `setupToken` to create");
            tracing::info!("  the first admin account.");
            tracing::info!("==========================================================");
        }
        None => {
            tracing::info!("Server has existing users, setup complete");
        }
    }

    let app_state = state::AppState {
        db,
        jwt_secret,
        session_ttl_hours: config.session_ttl_hours,
        auth_rate_limit_per_minute: config.auth_rate_limit_per_minute,
        cookie_secure: config.cookie_secure,
    };

    let app = routes::build_router(app_state);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
