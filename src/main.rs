//! PartsLine storefront - pricing, coupons, fitment and checkout for aftermarket parts

use anyhow::{Context, Result};
use partsline_storefront::{api, crypto::PaymentTokenCipher, store::Store, Config};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let db = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("connecting to postgres")?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => { tracing::warn!(error = %e, "NATS unavailable, events will not be published"); None }
        },
        None => None,
    };

    let state = api::AppState {
        store: Store::new(db),
        nats,
        sessions: api::SessionKeys::from_secret(config.session_secret.as_bytes()),
        cipher: PaymentTokenCipher::from_base64_key(&config.payment_token_key).context("PAYMENT_TOKEN_KEY")?,
        shipping_rates: config.shipping_rates,
    };
    let app = api::router(state);

    tracing::info!("PartsLine storefront listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?, app).await?;
    Ok(())
}
