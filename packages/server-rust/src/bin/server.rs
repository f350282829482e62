//! gridtable server binary.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use gridtable_server::cli::ServerArgs;
use gridtable_server::{NetworkModule, TableStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();
    init_tracing(args.log_json);

    let definition = args.table_definition()?;
    let config = args.network_config();
    let store = Arc::new(TableStore::new(definition));

    let mut module = NetworkModule::new(config, store);
    let port = module.start().await?;
    info!(port, route = %args.route, "listening");

    module.serve(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
