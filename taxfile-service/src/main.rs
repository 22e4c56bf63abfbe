use service_core::observability::init_tracing;
use taxfile_service::{config::Config, Application};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info,taxfile_service=debug");

    let config = Config::from_env().expect("Failed to load configuration");
    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
