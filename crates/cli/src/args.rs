// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use cable::{ClientConfig, Identifier, OutboundFrame};
use clap::Parser;
use serde_json::Value;

/// cable: Action Cable command-line client
#[derive(Parser, Debug)]
#[command(name = "cable")]
#[command(about = "Subscribe to an Action Cable channel and print its broadcasts")]
pub struct Args {
    /// Cable server URL (ws:// or wss://)
    #[arg(required_unless_present = "config")]
    pub url: Option<String>,

    /// Load connection settings from a TOML file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Origin header sent with the handshake
    #[arg(long)]
    pub origin: Option<String>,

    /// Channel class to subscribe to
    #[arg(short = 'C', long)]
    pub channel: String,

    /// Extra identifier field as key=value (repeatable). Values are parsed
    /// as JSON when possible, otherwise taken as strings.
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, Value)>,

    /// Action to perform once subscribed
    #[arg(long)]
    pub perform: Option<String>,

    /// JSON object sent along with --perform
    #[arg(long, requires = "perform")]
    pub data: Option<String>,

    /// Log every ping received from the server
    #[arg(long)]
    pub log_ping: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Resolve the client configuration: file first, then flags.
    pub fn client_config(&self) -> cable::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if self.origin.is_some() {
            config.origin = self.origin.clone();
        }
        config.log_ping |= self.log_ping;
        config.validate()?;
        Ok(config)
    }

    /// Identifier for the channel; `--channel` wins over a `channel` param.
    pub fn identifier(&self) -> Identifier {
        let mut identifier = Identifier::default();
        for (key, value) in &self.params {
            identifier.insert(key.clone(), value.clone());
        }
        identifier.insert(cable_core::CHANNEL_KEY, self.channel.clone());
        identifier
    }

    /// The action requested with `--perform`, if any.
    pub fn frame(&self) -> cable::Result<Option<OutboundFrame>> {
        let Some(action) = &self.perform else {
            return Ok(None);
        };
        let data: Value = serde_json::from_str(self.data.as_deref().unwrap_or("{}"))
            .map_err(cable_core::Error::Json)?;
        Ok(Some(OutboundFrame::from_value(action.clone(), data)?))
    }
}

fn parse_param(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
