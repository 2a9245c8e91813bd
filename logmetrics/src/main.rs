use std::sync::Arc;

use clap::Parser;
use logmetrics::{
    config::{Config, Mode},
    error::StdError,
    generator::Generator,
    sender::{get_client, webpki_trust, HttpClient, Sender},
};

fn main() -> Result<(), StdError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(config))
}

async fn run(config: Config) -> Result<(), StdError> {
    let client = if config.insecure {
        get_client(|| None)?
    } else {
        get_client(|| Some(webpki_trust()))?
    };

    match config.mode {
        Mode::Metrics => {
            let generator = config.metric_generator()?;
            log::info!(
                "sending metrics for {} containers as org {}",
                generator.entities().len(),
                generator.org_id()
            );
            send(generator, client, &config).await
        }
        Mode::Plaintext => {
            let generator = config.plaintext_generator()?;
            log::info!(
                "sending {} lines per request",
                generator.lines_per_cycle()
            );
            send(generator, client, &config).await
        }
    }
}

async fn send<TGenerator>(
    generator: TGenerator,
    client: HttpClient,
    config: &Config,
) -> Result<(), StdError>
where
    TGenerator: Generator + 'static,
{
    let options = config.sender_options()?;
    let workers = options.workers.max(1);
    let period = options.period;
    let sender = Sender::new(Arc::new(generator), client, options)?;
    log::info!(
        "posting to {} every {period:?} from {workers} workers",
        sender.uri()
    );
    sender.send_forever().await;
    Ok(())
}
