//! Client for the serverless projects and traffic filters API.

pub mod client;
pub mod config;
pub mod metrics_defs;
pub mod types;

#[cfg(test)]
mod testutils;

pub use client::{ApiError, ApiResponse, HttpClient, ServerlessApi};
pub use config::ApiConfig;
