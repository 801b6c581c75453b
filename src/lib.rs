pub mod config;
pub mod logger;
pub mod resolver;

pub use config::*;
pub use logger::*;
pub use resolver::*;
