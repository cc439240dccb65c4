use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use zenstee::config::Config;
use zenstee::db::{self, AppState};
use zenstee::email::EmailService;
use zenstee::payments::RazorpayClient;

#[derive(Parser)]
#[command(author, version, about = "Zenstee storefront API server")]
struct Cli {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database file (overrides DATABASE_PATH)
    #[arg(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zenstee=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    let pool = db::create_pool(&config.database_path)
        .with_context(|| format!("Failed to open database at {}", config.database_path))?;
    {
        let conn = pool.get().context("Failed to get database connection")?;
        db::init_db(&conn).context("Failed to initialize database schema")?;
    }
    tracing::info!(path = %config.database_path, "Database ready");

    let payments = config.razorpay.as_ref().map(RazorpayClient::new);
    if payments.is_none() {
        tracing::warn!("RAZORPAY_KEY_ID/RAZORPAY_KEY_SECRET not set, checkout endpoints will fail");
    }

    let email = EmailService::new(
        config.email.as_ref(),
        config.admin_email.clone(),
        config.store_name.clone(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to configure email: {}", e))?;
    if !email.is_enabled() {
        tracing::warn!("EMAIL_HOST/EMAIL_FROM not set, order emails will be skipped");
    }

    let state = AppState {
        db: pool,
        payments,
        email,
    };

    tracing::info!(uploads = %config.uploads_dir, "Serving static uploads");
    let app = zenstee::app(state, &config.uploads_dir);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server running on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
