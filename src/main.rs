// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use hint_gateway::{
    admission::{HintPipeline, IdentityVerifier, JwtIdentityVerifier},
    api::{start_server, AppState},
    cli::{signed_headers, Cli, Commands},
    config::{AuthMode, HintServiceConfig},
    hints::{GroqClient, HintGenerator},
    utils::{Clock, SystemClock},
};
use std::{env, sync::Arc};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Some(Commands::Sign(args)) = &cli.command {
        let (timestamp, signature) = signed_headers(args, SystemClock.now_millis());
        println!("X-Timestamp: {}", timestamp);
        println!("X-Signature: {}", signature);
        return Ok(());
    }

    info!("Starting {}", hint_gateway::version::get_version_string());

    let mut config = HintServiceConfig::from_env().context("failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;
    info!("Configuration: {:?}", config);

    let generator = build_generator(&config)?;
    let identity = build_identity_verifier(&config)?;

    let pipeline = HintPipeline::new(&config, generator, identity, Arc::new(SystemClock));
    info!(
        "Admission: auth={}, rate limit {}/{}s, device limit {}/day",
        config.auth_mode,
        config.effective_rate_limit(),
        config.rate_limit.window_secs,
        config.daily_device_limit
    );

    start_server(AppState::new(pipeline), &config.listen_addr).await
}

fn build_generator(config: &HintServiceConfig) -> Result<Option<Arc<dyn HintGenerator>>> {
    let Some(api_key) = config.generator.api_key.as_deref() else {
        warn!("GROQ_API_KEY not set; all requests will receive fallback hints");
        return Ok(None);
    };

    let client = GroqClient::new(
        &config.generator.api_url,
        api_key,
        &config.generator.model,
        config.generator.timeout_ms,
    )
    .context("failed to build Groq client")?;
    info!("Hint provider: Groq ({})", client.model());

    Ok(Some(Arc::new(client)))
}

fn build_identity_verifier(
    config: &HintServiceConfig,
) -> Result<Option<Arc<dyn IdentityVerifier>>> {
    if config.auth_mode != AuthMode::Bearer {
        return Ok(None);
    }

    let identity = &config.identity;
    let verifier = match (&identity.jwt_public_key_pem, &identity.jwt_secret) {
        (Some(pem), _) => JwtIdentityVerifier::with_rsa_pem(pem.as_bytes(), &identity.project_id)
            .context("invalid IDENTITY_JWT_PUBLIC_KEY_PEM")?,
        (None, Some(secret)) => {
            JwtIdentityVerifier::with_hmac_secret(secret.as_bytes(), &identity.project_id)
        }
        // validate() rejects bearer mode without a key
        (None, None) => return Ok(None),
    };
    info!("Bearer tokens verified for project {}", identity.project_id);

    Ok(Some(Arc::new(verifier)))
}
