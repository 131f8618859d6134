// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bearer-token identity for the alternate authentication mode
//!
//! The identity provider is an external collaborator: it turns an ID token
//! into a stable user id or refuses it. [`JwtIdentityVerifier`] checks
//! provider-issued JWTs locally against a configured key.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::AdmissionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub auth_time: Option<u64>,
    pub expires_at: u64,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("token rejected: {0}")]
    Rejected(String),

    #[error("identity provider misconfigured: {0}")]
    Configuration(String),
}

/// `verify(token) -> {uid} | error`
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError>;
}

/// Claims carried by provider ID tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    pub aud: String,
    pub iss: String,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_time: Option<u64>,
}

/// Verifies ID tokens issued for one project
pub struct JwtIdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    /// Issuer expected for tokens of `project_id`
    pub fn issuer_for(project_id: &str) -> String {
        format!("https://securetoken.google.com/{}", project_id)
    }

    /// HS256 tokens signed with a shared secret
    pub fn with_hmac_secret(secret: &[u8], project_id: &str) -> Self {
        Self::build(DecodingKey::from_secret(secret), Algorithm::HS256, project_id)
    }

    /// RS256 tokens checked against a PEM-encoded public key
    pub fn with_rsa_pem(pem: &[u8], project_id: &str) -> Result<Self, IdentityError> {
        let key = DecodingKey::from_rsa_pem(pem)
            .map_err(|e| IdentityError::Configuration(e.to_string()))?;
        Ok(Self::build(key, Algorithm::RS256, project_id))
    }

    fn build(key: DecodingKey, algorithm: Algorithm, project_id: &str) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.set_audience(&[project_id]);
        validation.set_issuer(&[Self::issuer_for(project_id)]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);
        Self { key, validation }
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let data = decode::<IdTokenClaims>(token, &self.key, &self.validation)
            .map_err(|e| IdentityError::Rejected(e.to_string()))?;

        if data.claims.sub.is_empty() {
            return Err(IdentityError::Rejected("empty subject".to_string()));
        }

        Ok(VerifiedIdentity {
            uid: data.claims.sub,
            auth_time: data.claims.auth_time,
            expires_at: data.claims.exp,
        })
    }
}

/// Extracts `<token>` from `Bearer <token>`
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AdmissionError> {
    let header = header.ok_or(AdmissionError::MissingAuthHeader)?;
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AdmissionError::InvalidAuthFormat),
    }
}
