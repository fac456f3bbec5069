//! Vacancy Feed Library
//!
//! Classifies scraped job vacancies and maintains an append-only RSS feed

pub mod config;
pub mod error;
pub mod feed;
pub mod filter;
pub mod guid;
pub mod logging;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod scrapers;
pub mod storage;
pub mod types;
pub mod validate;

pub use types::*;
