// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Command line for the hint gateway binary

use clap::{Args, Parser, Subcommand};

use crate::admission::sign;
use crate::config::{AuthMode, HintServiceConfig};

/// Hint Gateway
#[derive(Parser, Debug)]
#[command(name = "hint-gateway")]
#[command(version)]
#[command(about = "Admission-controlled hint generation service", long_about = None)]
pub struct Cli {
    /// Address to bind, e.g. 0.0.0.0:3000
    #[arg(long, env = "LISTEN_ADDR", global = true)]
    pub listen_addr: Option<String>,

    /// How callers authenticate
    #[arg(long, env = "AUTH_MODE", value_enum, global = true)]
    pub auth_mode: Option<AuthMode>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Print signature headers for a request, for manual testing
    Sign(SignArgs),
}

#[derive(Args, Debug)]
pub struct SignArgs {
    #[arg(long)]
    pub word: String,

    #[arg(long)]
    pub topic: String,

    /// Shared app secret
    #[arg(long, env = "APP_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Milliseconds since the epoch; defaults to now
    #[arg(long)]
    pub timestamp: Option<i64>,
}

impl Cli {
    /// Flags take precedence over values loaded from the environment
    pub fn apply_overrides(&self, config: &mut HintServiceConfig) {
        if let Some(addr) = &self.listen_addr {
            config.listen_addr = addr.clone();
        }
        if let Some(mode) = self.auth_mode {
            config.auth_mode = mode;
        }
    }
}

/// `X-Timestamp` and `X-Signature` values for a signed request
pub fn signed_headers(args: &SignArgs, now_millis: i64) -> (String, String) {
    let timestamp = args.timestamp.unwrap_or(now_millis).to_string();
    let signature = sign(args.secret.as_bytes(), &args.word, &args.topic, &timestamp);
    (timestamp, signature)
}
