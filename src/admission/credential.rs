// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Static shared-secret gate (`X-App-Secret`)

use subtle::ConstantTimeEq;

use super::types::AdmissionError;

/// Compares the presented app secret against the configured one
#[derive(Clone)]
pub struct CredentialGate {
    secret: Vec<u8>,
}

impl CredentialGate {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Fails closed: a missing, empty or mismatched secret is rejected, and an
    /// empty configured secret rejects everything.
    pub fn verify_app_secret(&self, presented: Option<&str>) -> bool {
        match presented {
            Some(presented) if !presented.is_empty() && !self.secret.is_empty() => {
                presented.as_bytes().ct_eq(&self.secret).into()
            }
            _ => false,
        }
    }

    pub fn check(&self, presented: Option<&str>) -> Result<(), AdmissionError> {
        if self.verify_app_secret(presented) {
            Ok(())
        } else {
            Err(AdmissionError::InvalidAppSecret)
        }
    }
}

impl std::fmt::Debug for CredentialGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialGate")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
