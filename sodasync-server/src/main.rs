use sodasync_config::load_config;
use sodasync_server::{config::ServerConfig, startup::Application};
use sodasync_telemetry::init_tracing;
use tracing::info;

fn main() -> anyhow::Result<()> {
    // Initialize tracing from the binary name.
    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    actix_web::rt::System::new().block_on(async_main())?;

    Ok(())
}

async fn async_main() -> anyhow::Result<()> {
    let config = load_config::<ServerConfig>()?;
    info!(
        pipeline_id = config.pipeline.id,
        source = ?config.source,
        destination = ?config.destination,
        "loaded server configuration"
    );

    let application = Application::build(config).await?;
    info!(port = application.port(), "starting sync trigger server");
    application.run_until_stopped().await?;

    Ok(())
}
