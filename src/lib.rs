pub mod config;
pub mod error;
pub mod mapper;
pub mod pipeline;
pub mod sensor;
pub mod snapshot;
pub mod types;
