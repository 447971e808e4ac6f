// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! cable: command-line Action Cable client.
//!
//! Subscribes to one channel, optionally performs an action on it, and
//! prints every broadcast as a JSON line on stdout until interrupted. Logs
//! go to stderr.

mod args;

use cable::{Connection, Subscription};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use args::Args;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.client_config()?;
    let frame = args.frame()?;
    let identifier = args.identifier();

    info!("Starting cable client");
    info!("  Server: {}", config.url);
    if let Some(origin) = &config.origin {
        info!("  Origin: {}", origin);
    }
    info!("  Channel: {}", identifier);

    let connection = Connection::with_config(config)?;
    let subscription = Subscription::new(&connection, identifier);
    subscription.on_receive(|message| println!("{}", message));

    connection.connect(None);
    subscription.create();
    if let Some(frame) = frame {
        info!("Performing {}", frame.action());
        subscription.send(frame);
    }

    tokio::signal::ctrl_c().await?;

    info!("Interrupted, unsubscribing");
    subscription.remove();
    connection.shutdown().await;

    Ok(())
}
