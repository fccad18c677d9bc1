//! OrderPilot entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Load configuration** from the environment (and `.env`, if present).
//! 2. **Wire observability**: `tracing-subscriber` with a JSON or pretty
//!    formatter, plus an OpenTelemetry OTLP exporter when
//!    `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
//! 3. **Construct infrastructure**: the row store (in-memory or Google
//!    Sheets), the ledger and settings adapters, and the alert notifier.
//! 4. **Serve** the webhook routes until Ctrl-C or SIGTERM.

mod config;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use fulfillment::{AlertNotifier, Autopilot, RuleTable, VendorCredentials};
use handlers::FulfillmentService;
use sheets::{GoogleSheetsClient, GoogleSheetsConfig, MemoryRowStore, RowStore};
use sheets::{SheetOrderLedger, SheetSettingsStore};
use tracing::{info, warn};

use crate::config::{AppConfig, StoreBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal outside local development.
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let _telemetry = telemetry::init(config.log_format, config.otlp_endpoint.as_deref())?;

    let credentials = VendorCredentials::from_lookup(|var| std::env::var(var).ok());
    for (vendor, status) in credentials.status_report() {
        info!(%vendor, credential = status, "vendor credential check");
    }

    let service = build_service(&config, credentials)?;
    let listener = listener::bind(config.bind).await?;
    listener::serve(listener, service, shutdown_signal()).await?;
    Ok(())
}

fn build_service(
    config: &AppConfig,
    credentials: VendorCredentials,
) -> anyhow::Result<FulfillmentService> {
    let rows: Arc<dyn RowStore> = match &config.store {
        StoreBackend::Memory => {
            warn!("using in-memory store; orders are lost on restart");
            Arc::new(MemoryRowStore::new())
        }
        StoreBackend::Sheets {
            spreadsheet_id,
            access_token,
        } => {
            info!(%spreadsheet_id, "using Google Sheets store");
            Arc::new(
                GoogleSheetsClient::new(GoogleSheetsConfig::new(spreadsheet_id, access_token))
                    .context("creating Google Sheets client")?,
            )
        }
    };

    let notifier: Arc<dyn AlertNotifier> = match &config.alert_endpoint {
        Some(endpoint) => Arc::new(
            alerts::FormRelayNotifier::new(endpoint).context("creating alert relay client")?,
        ),
        None => {
            warn!("alert relay disabled; alerts are only logged");
            Arc::new(alerts::LogOnlyNotifier)
        }
    };

    Ok(FulfillmentService::new(
        Arc::new(SheetOrderLedger::new(rows.clone(), &config.orders_table)),
        Arc::new(SheetSettingsStore::new(rows, &config.settings_table)),
        notifier,
        Autopilot::new(RuleTable::default(), credentials),
        config.recipients.clone(),
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
