mod health;
mod mapping;

pub use health::health_handler;
pub use mapping::{create_mapping_handler, list_mappings_handler};
