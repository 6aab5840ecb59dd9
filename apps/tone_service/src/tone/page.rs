use askama::Template;
use uuid::Uuid;

use super::form_controller::{FormController, Outcome};

pub struct RowView {
    pub id: String,
    pub name: String,
    pub value: u8,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>AI Tone Modifier</title>
  </head>
  <body>
    <main>
      <h1>AI Tone Modifier</h1>
      <form method="post" action="/sessions/{{ session_id }}/submit">
        <button type="submit" formaction="/sessions/{{ session_id }}/save" tabindex="-1" aria-hidden="true" style="position: absolute; left: -9999px;">Save</button>
        <section>
          <label for="api-key">OpenAI API Key</label>
          <input id="api-key" name="api_key" type="password" placeholder="Enter your OpenAI API key" value="{{ api_key }}" />
        </section>

        <section>
          <h3>Custom Features</h3>
          {% for row in rows %}
          <div class="feature-row">
            <input name="feature_name_{{ row.id }}" value="{{ row.name }}" placeholder="Feature name" />
            <input name="feature_value_{{ row.id }}" type="range" min="0" max="100" step="1" value="{{ row.value }}" />
            <span>{{ row.value }}%</span>
            <button type="submit" formaction="/sessions/{{ session_id }}/features/{{ row.id }}/remove" aria-label="Remove feature">&times;</button>
          </div>
          {% endfor %}
          <div class="feature-add">
            <input name="new_feature" placeholder="New feature name" />
            <button type="submit" formaction="/sessions/{{ session_id }}/features">Add Feature</button>
          </div>
        </section>

        <section>
          <textarea name="text" rows="8" placeholder="Enter your text here...">{{ text }}</textarea>
          <button type="submit" formaction="/sessions/{{ session_id }}/save">Save Changes</button>
          <button type="submit" {% if !can_submit %}disabled{% endif %}>{% if loading %}Modifying...{% else %}Modify Text{% endif %}</button>
        </section>
      </form>

      {% match error %}
      {% when Some with (message) %}
      <div class="alert" role="alert">
        <strong>Error</strong>
        <p>{{ message }}</p>
      </div>
      {% when None %}
      {% endmatch %}

      {% match result %}
      {% when Some with (modified) %}
      <section class="result">
        <h3>Modified Text:</h3>
        <div>{{ modified }}</div>
      </section>
      {% when None %}
      {% endmatch %}
    </main>
  </body>
</html>"#,
    ext = "html"
)]
pub struct ToneModifierPage {
    pub session_id: String,
    pub api_key: String,
    pub text: String,
    pub rows: Vec<RowView>,
    pub can_submit: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub result: Option<String>,
}

impl ToneModifierPage {
    pub fn from_form(session_id: Uuid, form: &FormController) -> Self {
        let (error, result) = match form.outcome() {
            Some(Outcome::Error(message)) => (Some(message.to_string()), None),
            Some(Outcome::Result(modified)) => (None, Some(modified.to_string())),
            None => (None, None),
        };

        Self {
            session_id: session_id.to_string(),
            api_key: form.api_key().to_string(),
            text: form.text().to_string(),
            rows: form
                .rows()
                .iter()
                .map(|row| RowView {
                    id: row.id.to_string(),
                    name: row.feature.name.clone(),
                    value: row.feature.value,
                })
                .collect(),
            can_submit: form.can_submit(),
            loading: form.is_loading(),
            error,
            result,
        }
    }
}
