//! Small utilities around hosted generative media models
//!
//! Generates music and video from text prompts through a hosted inference
//! API, re-emits JSON documents through the structured logger, and produces
//! short plain-text summaries of web search results.

pub mod app;
pub mod error;
pub mod inference;
pub mod json_log;
pub mod models;
pub mod search;

pub use error::{Error, Result};
