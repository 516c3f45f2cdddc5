use subscribe_mailer::config::get_configuration;
use subscribe_mailer::startup::AppServer;
use subscribe_mailer::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configuration = get_configuration()?;

    init_subscriber(get_subscriber(
        "subscribe_mailer".into(),
        configuration.app.log_level.clone(),
        std::io::stdout,
    ));

    let server = AppServer::build(configuration)?;
    server.run_until_stopped().await?;

    Ok(())
}
