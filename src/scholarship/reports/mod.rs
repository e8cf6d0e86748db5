pub mod calendar;
pub mod config;
pub mod donors;
pub mod error;
pub mod flatten;
pub mod grants;
pub mod io;
pub mod pipeline;

pub use error::{FundError, Result};
