//! delivr configuration and bundle-output resolution
//!
//! This module exports the core components for testing and integration.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
