// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the hint gateway
//!
//! Values are read from environment variables (a `.env` file is honoured by
//! the binary). Every knob has a default matching the production deployment.

use serde::Serialize;
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How stages 1-2 of the admission pipeline authenticate a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Shared app secret plus per-request HMAC signature
    Signature,
    /// `Authorization: Bearer <token>` verified by the identity provider
    #[value(alias = "jwt")]
    Bearer,
}

impl FromStr for AuthMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "signature" => Ok(AuthMode::Signature),
            "bearer" | "jwt" => Ok(AuthMode::Bearer),
            other => Err(ConfigError::Invalid {
                key: "AUTH_MODE",
                reason: format!("unknown auth mode '{}'", other),
            }),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Signature => write!(f, "signature"),
            AuthMode::Bearer => write!(f, "bearer"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} is required when auth mode is {mode}")]
    Missing { key: &'static str, mode: AuthMode },

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Sliding-window limits
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Window length in seconds
    pub window_secs: u64,
    /// Ceiling per client address (signature mode)
    pub max_requests: usize,
    /// Ceiling per verified user id (bearer mode)
    pub bearer_max_requests: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            max_requests: 15,
            bearer_max_requests: 20,
        }
    }
}

/// Response cache sizing
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 60 * 60,
            max_entries: 1000,
        }
    }
}

/// Outbound LLM provider settings
#[derive(Clone)]
pub struct GeneratorConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub timeout_ms: u64,
    /// Process-wide ceiling on provider calls per minute
    pub rate_limit_per_minute: u32,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            timeout_ms: 10_000,
            rate_limit_per_minute: 300,
            max_tokens: 200,
            temperature: 0.7,
        }
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Identity provider settings used in bearer mode
#[derive(Clone)]
pub struct IdentityConfig {
    pub project_id: String,
    /// HS256 shared secret
    pub jwt_secret: Option<String>,
    /// RS256 public key (PEM); takes precedence over `jwt_secret`
    pub jwt_public_key_pem: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            project_id: "action-reaction-game".to_string(),
            jwt_secret: None,
            jwt_public_key_pem: None,
        }
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("project_id", &self.project_id)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("jwt_public_key_pem", &self.jwt_public_key_pem.is_some())
            .finish()
    }
}

/// Top-level service configuration
#[derive(Clone)]
pub struct HintServiceConfig {
    pub listen_addr: String,
    pub auth_mode: AuthMode,
    pub app_secret: String,
    /// Accepted clock skew for `X-Timestamp`, either direction
    pub timestamp_tolerance_secs: u64,
    pub rate_limit: RateLimitConfig,
    pub daily_device_limit: u32,
    /// Offset used for calendar days; `None` follows the host's zone,
    /// re-resolved on every quota check
    pub quota_utc_offset_minutes: Option<i32>,
    /// Key signature-mode callers on `X-Forwarded-For`/`X-Real-IP` instead of
    /// the peer address. Enable only behind a proxy that overwrites them.
    pub trust_proxy_headers: bool,
    pub cache: CacheConfig,
    pub generator: GeneratorConfig,
    pub identity: IdentityConfig,
}

impl Default for HintServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            auth_mode: AuthMode::Signature,
            app_secret: String::new(),
            timestamp_tolerance_secs: 5 * 60,
            rate_limit: RateLimitConfig::default(),
            daily_device_limit: 200,
            quota_utc_offset_minutes: None,
            trust_proxy_headers: false,
            cache: CacheConfig::default(),
            generator: GeneratorConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

impl fmt::Debug for HintServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HintServiceConfig")
            .field("listen_addr", &self.listen_addr)
            .field("auth_mode", &self.auth_mode)
            .field("app_secret", &"[REDACTED]")
            .field("timestamp_tolerance_secs", &self.timestamp_tolerance_secs)
            .field("rate_limit", &self.rate_limit)
            .field("daily_device_limit", &self.daily_device_limit)
            .field("quota_utc_offset_minutes", &self.quota_utc_offset_minutes)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .field("cache", &self.cache)
            .field("generator", &self.generator)
            .field("identity", &self.identity)
            .finish()
    }
}

fn env_parse<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            reason: format!("could not parse '{}'", raw),
        }),
        _ => Ok(default),
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl HintServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let auth_mode = match env_opt("AUTH_MODE") {
            Some(raw) => raw.parse()?,
            None => defaults.auth_mode,
        };

        let quota_utc_offset_minutes = match env_opt("QUOTA_UTC_OFFSET_MINUTES") {
            Some(raw) => Some(raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "QUOTA_UTC_OFFSET_MINUTES",
                reason: format!("could not parse '{}'", raw),
            })?),
            None => None,
        };

        Ok(Self {
            listen_addr: env_opt("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            auth_mode,
            app_secret: env::var("APP_SECRET").unwrap_or_default(),
            timestamp_tolerance_secs: env_parse(
                "TIMESTAMP_TOLERANCE_SECS",
                defaults.timestamp_tolerance_secs,
            )?,
            rate_limit: RateLimitConfig {
                window_secs: env_parse("RATE_LIMIT_WINDOW_SECS", defaults.rate_limit.window_secs)?,
                max_requests: env_parse("RATE_LIMIT_MAX", defaults.rate_limit.max_requests)?,
                bearer_max_requests: env_parse(
                    "BEARER_RATE_LIMIT_MAX",
                    defaults.rate_limit.bearer_max_requests,
                )?,
            },
            daily_device_limit: env_parse("DAILY_DEVICE_LIMIT", defaults.daily_device_limit)?,
            quota_utc_offset_minutes,
            trust_proxy_headers: env_parse("TRUST_PROXY_HEADERS", defaults.trust_proxy_headers)?,
            cache: CacheConfig {
                ttl_secs: env_parse("HINT_CACHE_TTL_SECS", defaults.cache.ttl_secs)?,
                max_entries: env_parse("HINT_CACHE_MAX_ENTRIES", defaults.cache.max_entries)?,
            },
            generator: GeneratorConfig {
                api_key: env_opt("GROQ_API_KEY"),
                api_url: env_opt("GROQ_API_URL").unwrap_or(defaults.generator.api_url),
                model: env_opt("GROQ_MODEL").unwrap_or(defaults.generator.model),
                timeout_ms: env_parse("GENERATOR_TIMEOUT_MS", defaults.generator.timeout_ms)?,
                rate_limit_per_minute: env_parse(
                    "GENERATOR_RATE_LIMIT_PER_MINUTE",
                    defaults.generator.rate_limit_per_minute,
                )?,
                max_tokens: defaults.generator.max_tokens,
                temperature: defaults.generator.temperature,
            },
            identity: IdentityConfig {
                project_id: env_opt("FIREBASE_PROJECT_ID").unwrap_or(defaults.identity.project_id),
                jwt_secret: env_opt("IDENTITY_JWT_SECRET"),
                jwt_public_key_pem: env_opt("IDENTITY_JWT_PUBLIC_KEY_PEM"),
            },
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.auth_mode {
            AuthMode::Signature if self.app_secret.is_empty() => {
                return Err(ConfigError::Missing {
                    key: "APP_SECRET",
                    mode: self.auth_mode,
                });
            }
            AuthMode::Bearer
                if self.identity.jwt_secret.is_none()
                    && self.identity.jwt_public_key_pem.is_none() =>
            {
                return Err(ConfigError::Missing {
                    key: "IDENTITY_JWT_SECRET or IDENTITY_JWT_PUBLIC_KEY_PEM",
                    mode: self.auth_mode,
                });
            }
            _ => {}
        }

        let zero_checks: [(&'static str, bool); 7] = [
            ("RATE_LIMIT_WINDOW_SECS", self.rate_limit.window_secs == 0),
            ("RATE_LIMIT_MAX", self.rate_limit.max_requests == 0),
            ("BEARER_RATE_LIMIT_MAX", self.rate_limit.bearer_max_requests == 0),
            ("DAILY_DEVICE_LIMIT", self.daily_device_limit == 0),
            ("HINT_CACHE_TTL_SECS", self.cache.ttl_secs == 0),
            ("HINT_CACHE_MAX_ENTRIES", self.cache.max_entries == 0),
            ("GENERATOR_TIMEOUT_MS", self.generator.timeout_ms == 0),
        ];
        if let Some((key, _)) = zero_checks.iter().find(|(_, is_zero)| *is_zero) {
            return Err(ConfigError::Invalid {
                key: *key,
                reason: "must be greater than 0".to_string(),
            });
        }

        if let Some(offset) = self.quota_utc_offset_minutes {
            if offset.abs() >= 24 * 60 {
                return Err(ConfigError::Invalid {
                    key: "QUOTA_UTC_OFFSET_MINUTES",
                    reason: format!("{} is outside +/-1439", offset),
                });
            }
        }

        Ok(())
    }

    /// Rate-limit ceiling for the configured auth mode
    pub fn effective_rate_limit(&self) -> usize {
        match self.auth_mode {
            AuthMode::Signature => self.rate_limit.max_requests,
            AuthMode::Bearer => self.rate_limit.bearer_max_requests,
        }
    }
}
