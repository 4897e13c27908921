mod cli;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::{anyhow, Context};
use clap::Parser;
use sheetlink_gateway::{telemetry, App, AppState};
use sheetlink_mapping::MappingService;
use sheetlink_storage::sheets::{
    ServiceAccountKey, ServiceAccountTokenProvider, StaticTokenProvider, TokenProvider,
};
use sheetlink_storage::{InMemoryTable, MySqlTable, SheetsConfig, SheetsTable, TabularStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    telemetry::init(config.log_format);

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        range = %config.range,
        "starting mapping gateway"
    );

    let store = build_store(&config).await?;
    let service = MappingService::new(store)
        .with_layout(config.column_order.into())
        .with_duplicate_policy(config.duplicates.into());
    let state = AppState::new(Arc::new(service));

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

async fn build_store(config: &CLI) -> anyhow::Result<Arc<dyn TabularStore>> {
    match config.storage {
        StorageBackendArg::InMemory => {
            warn!("in-memory storage selected; mappings are lost on shutdown");
            Ok(Arc::new(InMemoryTable::new()))
        }
        StorageBackendArg::Sheets => {
            let spreadsheet_id = config
                .spreadsheet_id
                .clone()
                .ok_or_else(|| anyhow!("sheets storage needs a spreadsheet id"))?;
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()
                .context("cannot build http client")?;

            let tokens = build_token_provider(config, client.clone()).await?;
            let sheets = SheetsConfig::builder()
                .spreadsheet_id(spreadsheet_id)
                .range(config.range.clone())
                .value_input(config.value_input.into())
                .api_base(config.sheets_api_base.clone())
                .build();

            Ok(Arc::new(SheetsTable::new(client, sheets, tokens)))
        }
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .ok_or_else(|| anyhow!("mysql dsn is required when storage backend is mysql"))?;
            let table = MySqlTable::connect(mysql_dsn)
                .await
                .context("cannot connect to mysql")?;
            table
                .ensure_schema()
                .await
                .context("cannot create mysql schema")?;
            Ok(Arc::new(table))
        }
    }
}

async fn build_token_provider(
    config: &CLI,
    client: reqwest::Client,
) -> anyhow::Result<Arc<dyn TokenProvider>> {
    if let Some(token) = &config.access_token {
        info!("using pre-issued access token");
        return Ok(Arc::new(StaticTokenProvider::new(token.clone())));
    }

    let key = match (&config.credentials_file, &config.client_email, &config.private_key) {
        (Some(path), _, _) => ServiceAccountKey::from_file(path)
            .await
            .context("cannot load service account key")?,
        (None, Some(email), Some(private_key)) => {
            ServiceAccountKey::new(email.clone(), config.client_id.clone(), private_key)
        }
        _ => {
            return Err(anyhow!(
                "sheets storage needs an access token, a key file, or an email and private key"
            ))
        }
    };

    info!(client_email = %key.client_email, "using service account credentials");
    let mut provider = ServiceAccountTokenProvider::new(client, key, &config.scope)
        .context("invalid service account credentials")?;
    if let Some(token_uri) = &config.token_uri {
        provider = provider.with_token_uri(token_uri.clone());
    }

    Ok(Arc::new(provider))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
