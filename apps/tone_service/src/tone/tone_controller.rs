use std::collections::HashMap;

use askama::Template;
use axum::{
    extract::Path,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Extension, Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tone_llm::Feature;
use uuid::Uuid;

use super::form_controller::{FeatureId, FormController};
use super::page::ToneModifierPage;
use crate::{app_module::AppState, error::AppError};

#[derive(Debug, Deserialize)]
pub struct ModifyTextRequest {
    pub text: String,
    #[serde(default)]
    pub features: Vec<Feature>,
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct ModifyTextResponse {
    pub result: String,
}

/// Fields posted by the page form. Feature rows arrive as `feature_name_<id>` / `feature_value_<id>`.
#[derive(Debug, Default)]
pub struct FormFields {
    pub api_key: Option<String>,
    pub text: Option<String>,
    pub new_feature: Option<String>,
    pub names: Vec<(FeatureId, String)>,
    pub values: Vec<(FeatureId, u32)>,
}

impl FormFields {
    pub fn from_pairs(pairs: HashMap<String, String>) -> Self {
        let mut fields = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "api_key" => fields.api_key = Some(value),
                "text" => fields.text = Some(value),
                "new_feature" => fields.new_feature = Some(value),
                _ => {
                    if let Some(id) = parse_row_key(&key, "feature_name_") {
                        fields.names.push((id, value));
                    } else if let Some(id) = parse_row_key(&key, "feature_value_") {
                        match value.trim().parse::<u32>() {
                            Ok(parsed) => fields.values.push((id, parsed)),
                            Err(_) => tracing::warn!("Ignoring invalid weight for {}: {}", key, value),
                        }
                    }
                }
            }
        }
        fields
    }

    pub fn apply(&self, form: &mut FormController) {
        if let Some(api_key) = &self.api_key {
            form.set_api_key(api_key.clone());
        }
        if let Some(text) = &self.text {
            form.set_text(text.clone());
        }
        for (id, name) in &self.names {
            form.rename_feature(*id, name.clone());
        }
        for (id, value) in &self.values {
            form.set_feature_value(*id, *value);
        }
    }
}

fn parse_row_key(key: &str, prefix: &str) -> Option<FeatureId> {
    key.strip_prefix(prefix)?.parse().ok().map(FeatureId)
}

pub fn tone_router() -> Router {
    Router::new()
        .route("/", get(create_session))
        .route("/sessions/:session_id", get(show_form))
        .route("/sessions/:session_id/save", post(save_form))
        .route("/sessions/:session_id/features", post(add_feature))
        .route(
            "/sessions/:session_id/features/:feature_id/remove",
            post(remove_feature),
        )
        .route("/sessions/:session_id/submit", post(submit_form))
        .route("/v1/text/modify", post(modify_text))
}

fn session_redirect(session_id: Uuid) -> Redirect {
    Redirect::to(&format!("/sessions/{}", session_id))
}

pub async fn create_session(Extension(ctx): Extension<AppState>) -> Redirect {
    let session_id = ctx.sessions.create();
    session_redirect(session_id)
}

pub async fn show_form(
    Extension(ctx): Extension<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let page = ctx
        .sessions
        .read(session_id, |form| ToneModifierPage::from_form(session_id, form))?;
    Ok(Html(page.render()?))
}

pub async fn save_form(
    Extension(ctx): Extension<AppState>,
    Path(session_id): Path<Uuid>,
    Form(pairs): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    let fields = FormFields::from_pairs(pairs);
    ctx.sessions
        .update(session_id, |form| fields.apply(form))?;
    Ok(session_redirect(session_id))
}

pub async fn add_feature(
    Extension(ctx): Extension<AppState>,
    Path(session_id): Path<Uuid>,
    Form(pairs): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    let fields = FormFields::from_pairs(pairs);
    let added = ctx.sessions.update(session_id, |form| {
        fields.apply(form);
        form.add_feature(fields.new_feature.as_deref().unwrap_or_default())
    })?;
    if let Some(id) = added {
        tracing::debug!(session_id = %session_id, feature_id = %id, "Feature added");
    }
    Ok(session_redirect(session_id))
}

pub async fn remove_feature(
    Extension(ctx): Extension<AppState>,
    Path((session_id, feature_id)): Path<(Uuid, u64)>,
    Form(pairs): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    let fields = FormFields::from_pairs(pairs);
    ctx.sessions.update(session_id, |form| {
        fields.apply(form);
        form.remove_feature(FeatureId(feature_id))
    })?;
    Ok(session_redirect(session_id))
}

pub async fn submit_form(
    Extension(ctx): Extension<AppState>,
    Path(session_id): Path<Uuid>,
    Form(pairs): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    let fields = FormFields::from_pairs(pairs);
    ctx.sessions
        .update(session_id, |form| fields.apply(form))?;
    ctx.service
        .tone_service
        .submit(&ctx.sessions, session_id)
        .await?;
    Ok(session_redirect(session_id))
}

pub async fn modify_text(
    Extension(ctx): Extension<AppState>,
    Json(request): Json<ModifyTextRequest>,
) -> impl IntoResponse {
    let features: Vec<Feature> = request
        .features
        .into_iter()
        .map(|feature| Feature::new(feature.name, feature.value))
        .collect();

    match ctx
        .service
        .tone_service
        .modify(&request.text, &features, &request.api_key)
        .await
    {
        Ok(result) => match serde_json::to_value(ModifyTextResponse { result }) {
            Ok(json_value) => (StatusCode::OK, Json(json_value)),
            Err(e) => {
                tracing::error!("Error serializing response: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "error": format!("Failed to serialize response: {}", e)
                    })),
                )
            }
        },
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({
                "error": e.message()
            })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn parses_row_fields_by_id() {
        let fields = FormFields::from_pairs(pairs(&[
            ("api_key", "sk-test"),
            ("feature_name_2", "Brevity"),
            ("feature_value_2", "35"),
            ("feature_value_3", "lots"),
            ("feature_name_x", "ignored"),
        ]));

        assert_eq!(fields.api_key.as_deref(), Some("sk-test"));
        assert_eq!(fields.text, None);
        assert_eq!(fields.names, vec![(FeatureId(2), "Brevity".to_string())]);
        assert_eq!(fields.values, vec![(FeatureId(2), 35)]);
    }

    #[test]
    fn apply_updates_only_posted_fields() {
        let mut form = FormController::default();
        form.set_text("keep me");

        FormFields::from_pairs(pairs(&[
            ("api_key", "sk-test"),
            ("feature_name_1", "Precision"),
            ("feature_value_4", "250"),
        ]))
        .apply(&mut form);

        assert_eq!(form.text(), "keep me");
        assert_eq!(form.api_key(), "sk-test");
        assert_eq!(form.rows()[0].feature, Feature::new("Precision", 90));
        assert_eq!(form.rows()[3].feature, Feature::new("Helpfulness", 100));
    }
}
