pub mod artifacts;
pub mod config;
pub mod delivery;
pub mod error;
pub mod exporter;
pub mod gemini;
pub mod html;
pub mod metrics;
pub mod orchestrator;
pub mod prompt;
pub mod schema;
pub mod sequencer;
pub mod snowflake;
pub mod source;
pub mod transcript;
