use crate::Feature;

/// Renders features as `"<name>: <value>%"` clauses joined by `", "`, keeping input order.
pub fn feature_list(features: &[Feature]) -> String {
    features
        .iter()
        .map(|feature| format!("{}: {}%", feature.name, feature.value))
        .collect::<Vec<String>>()
        .join(", ")
}

pub fn build_prompt(text: &str, features: &[Feature]) -> String {
    format!(
        r#"Please modify the following text according to these characteristics: {}.
Text to modify: "{}"
Please return only the modified text without any explanations."#,
        feature_list(features),
        text
    )
}
