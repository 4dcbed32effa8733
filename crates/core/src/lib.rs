pub mod config;
pub mod error;
pub mod ids;
pub mod model;
pub mod sender;
pub mod time;

pub use error::{CombinedError, Result, SenderError, TanzuError};
