use std::net::TcpListener;

use socialnet::config::{bind_address, Settings};
use socialnet::core::logging::init_tracing;
use socialnet::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("socialnet=info");

    let settings = Settings::from_env();
    let address = bind_address();
    let listener = TcpListener::bind(&address)?;

    tracing::info!(
        %address,
        access_lifetime_secs = settings.access_token_lifetime.num_seconds(),
        "server listening"
    );

    socialnet::run(listener, AppState::new(settings))?.await?;
    Ok(())
}
