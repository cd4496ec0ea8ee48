pub mod data_client;
pub mod resolution;
pub mod types;

pub use data_client::{DataClient, DataClientError};
pub use resolution::{derive_resolution, ResolutionFact};
