// Library for the binary and tests

pub mod aggregator;
pub mod config;
pub mod encoder;
pub mod error;
pub mod expression;
pub mod input;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod rules;

pub use error::{Error, Result};
