pub mod config;
pub mod error;
pub mod profile;
pub mod query;
pub mod types;

pub use config::Config;
pub use error::ShelterError;
pub use profile::{FilterSelection, RescueProfile};
pub use query::{Condition, RecordQuery};
pub use types::*;
