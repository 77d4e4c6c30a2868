//! Langflow relay — webhook glue between Meta messaging and a Langflow workflow.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod relay;
pub mod server;
pub mod webhook;
pub mod workflow;
