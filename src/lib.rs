//! News coverage discovery and comparative sentiment analysis.
//!
//! The pipeline runs in four stages:
//!
//! - [`search`] lists candidate links for `"{company} company news"`
//! - [`discovery`] pages through results and drives [`extract`] per fresh link
//! - [`analysis`] scores each article and compares the finished set
//! - [`report`] and [`outputs`] shape and persist the result
//!
//! Network access goes through the [`http::PageFetcher`] and
//! [`search::SearchProvider`] traits, so every stage can run against fakes.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod delay;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod http;
pub mod models;
pub mod outputs;
pub mod report;
pub mod search;
pub mod utils;
