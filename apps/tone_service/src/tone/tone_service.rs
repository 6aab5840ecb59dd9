use std::sync::Arc;

use tone_llm::{Feature, ModelSettings, ModifyError, ProviderConnector};
use uuid::Uuid;

use super::form_controller::Phase;
use super::session_store::SessionStore;
use crate::error::AppError;

#[derive(Clone)]
pub struct ToneService {
    connector: Arc<dyn ProviderConnector>,
    settings: ModelSettings,
}

impl ToneService {
    pub fn new(connector: Arc<dyn ProviderConnector>, settings: ModelSettings) -> Self {
        Self {
            connector,
            settings,
        }
    }

    pub async fn modify(
        &self,
        text: &str,
        features: &[Feature],
        api_key: &str,
    ) -> Result<String, ModifyError> {
        tone_llm::modify_text_via(
            self.connector.as_ref(),
            text,
            features,
            api_key,
            &self.settings,
        )
        .await
    }

    /// Runs one submission for a session. Returns `Ok(None)` when the form is not ready to submit.
    ///
    /// The session lock is released while the provider call is in flight, so the form stays
    /// editable. The call runs on its own task and records its outcome even if the caller goes away.
    pub async fn submit(
        &self,
        sessions: &SessionStore,
        session_id: Uuid,
    ) -> Result<Option<Phase>, AppError> {
        let submission = match sessions.update(session_id, |form| form.begin_submit())? {
            Ok(submission) => submission,
            Err(e) => {
                tracing::debug!(session_id = %session_id, "{}", e);
                return Ok(None);
            }
        };

        tracing::info!(
            session_id = %session_id,
            features = submission.features.len(),
            "Submitting text for modification"
        );

        let service = self.clone();
        let sessions = sessions.clone();
        let task = tokio::spawn(async move {
            let outcome = service
                .modify(&submission.text, &submission.features, &submission.api_key)
                .await
                .map_err(|e| e.message().to_string());

            sessions.update(session_id, |form| {
                form.finish_submit(outcome);
                form.phase()
            })
        });

        let phase = task.await??;
        tracing::info!(session_id = %session_id, phase = ?phase, "Submission finished");
        Ok(Some(phase))
    }
}
