pub mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod server;
#[cfg(test)]
mod test;
mod utils;

pub use api::{Dataset, Mode};
pub use config::Config;
pub use error::DataError;
pub use error::Error;
pub use error::Result;
