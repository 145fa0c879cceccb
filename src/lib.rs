//! postforge - long-form post generation pipeline
//!
//! This library turns a single topic into a structured blog post by driving
//! external text and image generation providers: sticky model routing with a
//! keyless fallback, bounded retries, throttled sequential section generation,
//! and deterministic document assembly.

pub mod cli;
pub mod config;
pub mod document;
pub mod logging;
pub mod pipeline;
pub mod provider;
pub mod routing;
pub mod throttle;
