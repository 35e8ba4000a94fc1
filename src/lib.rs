pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod logging;
pub mod models;
pub mod prom;
pub mod rebuild;
pub mod s3;
pub mod snapshot;
pub mod table;
pub mod writer;

pub use error::{ExportError, Result};

