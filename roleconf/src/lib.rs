#![forbid(unsafe_code)]

pub mod config;
mod engine;
mod error;
pub mod identity;
mod resource;
pub mod schema;
pub mod statement;
mod version;

pub use config::{Config, ConfigBuilder};
pub use engine::*;
pub use error::*;
pub use resource::*;
pub use version::*;
