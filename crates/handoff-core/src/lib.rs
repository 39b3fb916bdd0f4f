pub mod analytics;
pub mod archive;
pub mod config;
pub mod delivery;
pub mod document;
pub mod error;
pub mod generator;
pub mod io;
pub mod monitor;
pub mod paths;
pub mod resume;
pub mod session;
pub mod types;
pub mod workflow;

pub use error::{HandoffError, Result};
