// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use sketchcast::{api::start_server, cli::Args, version};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Args::parse().into_config()?;

    println!("Starting {}...", version::get_version_string());
    println!("BUILD VERSION: {}", version::VERSION);
    println!("Build Date: {}", version::BUILD_DATE);
    println!("Providers: {}", config.provider_order.join(" -> "));
    println!();

    start_server(config).await
}
