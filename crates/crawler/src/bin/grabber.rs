//! `pricewatch-grabber` -- run one crawl job.
//!
//! Reads a crawl event (`{job_name, site_url, html_query, bucket_name}`)
//! as JSON from the first argument, or from stdin when no argument is
//! given, extracts the price, records it in the execution log of
//! `bucket_name`, and prints `{"site_url": .., "price": ..}`.
//!
//! When `AWS_LAMBDA_RUNTIME_API` is set the binary runs as a Lambda
//! function instead: each invocation payload is a crawl event and the
//! response is the `{"site_url": .., "price": ..}` object.
//!
//! # Environment variables
//!
//! | Variable                        | Default        | Description                      |
//! |---------------------------------|----------------|----------------------------------|
//! | `PRICEWATCH_BACKEND`            | `s3`           | `s3` or `local`                  |
//! | `AWS_REGION`                    | `eu-central-1` | Region of the S3 backend         |
//! | `PRICEWATCH_LOCAL_ROOT`         | `./data`       | Root directory of local backend  |
//! | `PRICEWATCH_FETCH_TIMEOUT_SECS` | `15`           | Page fetch timeout               |
//! | `PRICEWATCH_LOG_ENABLED`        | `true`         | Record executions                |

use std::io::Read;
use std::sync::Arc;

use lambda_runtime::{service_fn, LambdaEvent};
use pricewatch_crawler::config::GrabberConfig;
use pricewatch_crawler::{CrawlService, Extractor, HttpFetcher};
use serde_json::Value;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pricewatch_grabber=info,pricewatch_crawler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Crawl failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), lambda_runtime::Error> {
    let config = GrabberConfig::from_env()?;

    let fetcher = HttpFetcher::new(config.fetch_timeout)?;
    let service = CrawlService::new(
        config.storage.provider().await,
        Extractor::new(Arc::new(fetcher)),
        config.log,
    );

    if std::env::var_os("AWS_LAMBDA_RUNTIME_API").is_some() {
        let service = &service;
        return lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
            let outcome = service.handle_event(&event.payload).await?;
            Ok::<Value, lambda_runtime::Error>(serde_json::to_value(outcome)?)
        }))
        .await;
    }

    let raw = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let event: Value = serde_json::from_str(&raw)?;

    let outcome = service.handle_event(&event).await?;
    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}
