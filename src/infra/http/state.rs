use std::sync::Arc;

use crate::application::sessions::SessionService;
use crate::application::templates::{
    CustomizerRegistry, PublicProfileService, SelectionService, TemplateService,
};

/// Shared state for every API handler.
#[derive(Clone)]
pub struct ApiState {
    pub sessions: SessionService,
    pub templates: Arc<TemplateService>,
    pub selection: SelectionService,
    pub public_profiles: PublicProfileService,
    pub customizer: Arc<CustomizerRegistry>,
}
