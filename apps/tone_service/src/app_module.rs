use std::sync::Arc;

use tone_llm::{ModelSettings, ProviderConnector};

use crate::tone::{session_store::SessionStore, tone_service::ToneService};

#[derive(Clone)]
pub struct AppService {
    pub tone_service: ToneService,
}

impl AppService {
    pub fn new(connector: Arc<dyn ProviderConnector>, settings: ModelSettings) -> Self {
        let tone_service = ToneService::new(connector, settings);

        Self { tone_service }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub service: AppService,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        connector: Arc<dyn ProviderConnector>,
        settings: ModelSettings,
        sessions: SessionStore,
    ) -> Self {
        Self {
            service: AppService::new(connector, settings),
            sessions,
        }
    }
}
