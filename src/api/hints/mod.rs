// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hint generation API endpoint
//!
//! Provides the `/api/hints/generate` HTTP endpoint.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{generate_hints_handler, method_not_allowed_handler, preflight_handler};
pub use request::{client_addr, credentials_from_headers};
pub use response::GenerateHintsResponse;
