use anyhow::Context;
use lead_capture::configuration::get_configuration;
use lead_capture::startup::Application;
use lead_capture::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A `.env` file is optional, the real environment always wins.
    dotenvy::dotenv().ok();

    let subscriber = get_subscriber("lead-capture".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().context("Failed to read configuration")?;
    let application = Application::build(configuration).await?;
    tracing::info!(port = application.port(), "Lead capture service started");
    application.run_until_stopped().await?;

    Ok(())
}
