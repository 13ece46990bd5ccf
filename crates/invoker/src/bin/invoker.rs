//! `pricewatch-invoker` -- one monitoring pass over the catalog.
//!
//! Loads `website-monitor-list.yml` from the catalog store, submits one
//! crawl job per site, and prints the report
//! `[{"job_name": .., "status": ..}, ...]` as JSON. An invoke event
//! (`{"bucket_name": ..}`) may be passed as the first argument; otherwise
//! `PRICEWATCH_BUCKET` names the catalog store.
//!
//! Failed jobs appear in the report and do not change the exit code. The
//! process exits non-zero only when the catalog cannot be loaded or the
//! configuration is invalid.
//!
//! When `AWS_LAMBDA_RUNTIME_API` is set the binary runs as a Lambda
//! function instead: each invocation payload is an invoke event and the
//! response is the report array.
//!
//! # Environment variables
//!
//! | Variable                            | Default                    | Description                     |
//! |-------------------------------------|----------------------------|---------------------------------|
//! | `PRICEWATCH_BACKEND`                | `s3`                       | `s3` or `local`                 |
//! | `PRICEWATCH_BUCKET`                 | `aws-lambda-price-grabber` | Catalog store                   |
//! | `PRICEWATCH_LOCAL_ROOT`             | `./data`                   | Root directory of local backend |
//! | `AWS_REGION`                        | `eu-central-1`             | Region of S3 and Lambda         |
//! | `PRICEWATCH_TRANSPORT`              | `lambda`                   | `lambda` or `local`             |
//! | `PRICEWATCH_FUNCTION`               | `grab-price`               | Crawl function name             |
//! | `PRICEWATCH_MAX_CONCURRENCY`        | `4`                        | Jobs in flight at once          |
//! | `PRICEWATCH_TRANSPORT_TIMEOUT_SECS` | `60`                       | Per-job invocation timeout      |
//! | `PRICEWATCH_FETCH_TIMEOUT_SECS`     | `15`                       | Page fetch timeout (local)      |
//! | `PRICEWATCH_LOG_ENABLED`            | `true`                     | Record executions (local)       |

use std::sync::Arc;

use lambda_runtime::{service_fn, LambdaEvent};
use pricewatch_crawler::{CrawlService, Extractor, HttpFetcher};
use pricewatch_invoker::config::{InvokerConfig, TransportKind};
use pricewatch_invoker::{InvokeHandler, JobTransport, LambdaTransport, LocalTransport};
use serde_json::Value;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pricewatch_invoker=info,pricewatch_crawler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Run failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), lambda_runtime::Error> {
    let config = InvokerConfig::from_env()?;
    let provider = config.storage.provider().await;

    let transport: Arc<dyn JobTransport> = match &config.transport {
        TransportKind::Lambda {
            region,
            function_name,
        } => Arc::new(LambdaTransport::from_region(region, function_name.clone()).await),
        TransportKind::Local => {
            let fetcher = HttpFetcher::new(config.fetch_timeout)?;
            let service = CrawlService::new(
                provider.clone(),
                Extractor::new(Arc::new(fetcher)),
                config.log,
            );
            Arc::new(LocalTransport::new(Arc::new(service)))
        }
    };

    let handler = InvokeHandler::new(provider, transport, config.dispatch);

    if std::env::var_os("AWS_LAMBDA_RUNTIME_API").is_some() {
        let handler = &handler;
        return lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
            let reports = handler.run_event(&event.payload).await?;
            Ok::<Value, lambda_runtime::Error>(serde_json::to_value(reports)?)
        }))
        .await;
    }

    let event = match std::env::args().nth(1) {
        Some(raw) => serde_json::from_str(&raw)?,
        None => serde_json::json!({ "bucket_name": config.bucket }),
    };

    let report = handler.handle_invoke_event(&event).await?;
    println!("{report}");
    Ok(())
}
