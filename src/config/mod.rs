//! Configuration module for draftscope
//!
//! This module handles:
//! - User-level configuration (~/.config/draftscope/config.toml)
//! - Environment overrides for credentials and model selection
//! - Conversion into the explicit settings the pipeline and the
//!   completion client are constructed with

mod user_config;

pub use user_config::{AiSection, PipelineSection, UserConfig};
