pub mod catalog;
pub mod config;
pub mod error;
pub mod gaps;
pub mod hit;
pub mod id;
pub mod io;
pub mod matrix;
pub mod paths;
pub mod report;
pub mod scan;
pub mod store;
pub mod types;

pub use error::{Result, TraceError};
