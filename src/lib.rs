// Crate root library declaration and module exports.
pub mod cli;
pub mod config;
pub mod context;
pub mod dates;
pub mod error;
pub mod interval;
pub mod json;
pub mod locale;
pub mod logging;
pub mod storage;
pub mod text;
pub mod toolkit;

pub use error::{Error, Result};
