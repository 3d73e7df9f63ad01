mod api_doc;
mod auth;
mod error;
mod handlers;
mod setup;
mod state;

use surat_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;
    setup::init_tracing(&config);

    // Initialize the application (database, storage, routes)
    let (_state, router) = setup::initialize_app(config.clone()).await?;

    // Start the server
    setup::server::start_server(&config, router).await?;

    Ok(())
}
