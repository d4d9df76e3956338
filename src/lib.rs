pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod pipeline;
pub mod process;
pub mod schema;

pub use config::Config;
pub use model::{Dataset, DatasetModel, FilterCriteria};
pub use pipeline::Pipeline;
