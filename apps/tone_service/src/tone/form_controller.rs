use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tone_llm::{Feature, MAX_FEATURE_VALUE};

pub const DEFAULT_FEATURE_VALUE: u8 = 50;
pub const EMPTY_RESULT_FALLBACK: &str = "No result returned from the API.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub u64);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRow {
    pub id: FeatureId,
    pub feature: Feature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Success,
    Failed,
}

/// Inputs captured by value when a submission starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub text: String,
    pub features: Vec<Feature>,
    pub api_key: String,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Submission blocked: text, API key and at least one feature are required")]
    Blocked,
}

/// What the page shows below the form; never both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<'a> {
    Error(&'a str),
    Result(&'a str),
}

#[derive(Debug, Clone)]
pub struct FormController {
    text: String,
    api_key: String,
    rows: Vec<FeatureRow>,
    next_id: u64,
    phase: Phase,
    result: Option<String>,
    error: Option<String>,
}

impl Default for FormController {
    fn default() -> Self {
        let mut controller = Self::empty();
        for (name, value) in [
            ("Clarity", 90),
            ("Simplicity", 40),
            ("Friendliness", 100),
            ("Helpfulness", 70),
        ] {
            controller.push_row(Feature::new(name, value));
        }
        controller
    }
}

impl FormController {
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            api_key: String::new(),
            rows: Vec::new(),
            next_id: 1,
            phase: Phase::Idle,
            result: None,
            error: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = api_key.into();
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn features(&self) -> Vec<Feature> {
        self.rows.iter().map(|row| row.feature.clone()).collect()
    }

    fn push_row(&mut self, feature: Feature) -> FeatureId {
        let id = FeatureId(self.next_id);
        self.next_id += 1;
        self.rows.push(FeatureRow { id, feature });
        id
    }

    fn row_mut(&mut self, id: FeatureId) -> Option<&mut FeatureRow> {
        self.rows.iter_mut().find(|row| row.id == id)
    }

    /// Appends a row at the default weight. Blank names are ignored; others are stored as typed.
    pub fn add_feature(&mut self, name: &str) -> Option<FeatureId> {
        if name.trim().is_empty() {
            return None;
        }
        Some(self.push_row(Feature::new(name, DEFAULT_FEATURE_VALUE)))
    }

    pub fn rename_feature(&mut self, id: FeatureId, name: impl Into<String>) -> bool {
        match self.row_mut(id) {
            Some(row) => {
                row.feature.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn set_feature_value(&mut self, id: FeatureId, value: u32) -> bool {
        let value = value.min(MAX_FEATURE_VALUE as u32) as u8;
        match self.row_mut(id) {
            Some(row) => {
                row.feature.value = value;
                true
            }
            None => false,
        }
    }

    pub fn remove_feature(&mut self, id: FeatureId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.rows.len() != before
    }

    pub fn remove_feature_at(&mut self, index: usize) -> Option<FeatureRow> {
        if index < self.rows.len() {
            Some(self.rows.remove(index))
        } else {
            None
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn can_submit(&self) -> bool {
        !self.is_loading()
            && !self.text.trim().is_empty()
            && !self.api_key.trim().is_empty()
            && !self.rows.is_empty()
    }

    pub fn begin_submit(&mut self) -> Result<Submission, SubmitError> {
        if !self.can_submit() {
            return Err(SubmitError::Blocked);
        }

        self.error = None;
        self.phase = Phase::Submitting;

        Ok(Submission {
            text: self.text.clone(),
            features: self.features(),
            api_key: self.api_key.clone(),
        })
    }

    /// Records how a submission ended. A failure keeps the last good result but only the error is shown.
    pub fn finish_submit(&mut self, outcome: Result<String, String>) {
        match outcome {
            Ok(result) if result.is_empty() => {
                self.result = Some(EMPTY_RESULT_FALLBACK.to_string());
                self.error = None;
                self.phase = Phase::Success;
            }
            Ok(result) => {
                self.result = Some(result);
                self.error = None;
                self.phase = Phase::Success;
            }
            Err(message) => {
                self.error = Some(message);
                self.phase = Phase::Failed;
            }
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn outcome(&self) -> Option<Outcome<'_>> {
        if let Some(error) = self.error.as_deref() {
            return Some(Outcome::Error(error));
        }
        self.result.as_deref().map(Outcome::Result)
    }
}
