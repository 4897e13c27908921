use std::sync::Arc;

use sheetlink_mapping::Mappings;

#[derive(Clone)]
pub struct AppState {
    mappings: Arc<dyn Mappings>,
}

impl AppState {
    pub fn new(mappings: Arc<dyn Mappings>) -> Self {
        Self { mappings }
    }

    pub fn mappings(&self) -> &dyn Mappings {
        self.mappings.as_ref()
    }
}
