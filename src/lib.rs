// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod admission;
pub mod api;
pub mod cli;
pub mod config;
pub mod hints;
pub mod utils;
pub mod version;

pub use admission::{AdmissionError, HintOutcome, HintPipeline, RequestCredentials};
pub use config::{AuthMode, HintServiceConfig};
pub use hints::{HintService, HintSet};
