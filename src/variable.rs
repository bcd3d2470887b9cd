use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

static TOKEN_PATTERN: OnceLock<Regex> = OnceLock::new();

fn token_pattern() -> &'static Regex {
    TOKEN_PATTERN.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").unwrap())
}

/// Layered substitution context for `{{variable}}` templates.
/// Lookup precedence: extracted > environment > global.
#[derive(Clone, Debug, Default)]
pub struct VariableContext {
    global: HashMap<String, String>,
    environment: HashMap<String, String>,
    extracted: HashMap<String, String>,
}

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environment(environment: HashMap<String, String>) -> Self {
        VariableContext {
            environment,
            ..Self::default()
        }
    }

    pub fn set_global(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.global.insert(key.into(), value.into());
    }

    pub fn set_environment(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.environment.insert(key.into(), value.into());
    }

    pub fn set_extracted(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extracted.insert(key.into(), value.into());
    }

    pub fn merge_extracted(&mut self, variables: HashMap<String, String>) {
        self.extracted.extend(variables);
    }

    pub fn lookup(&self, name: &str) -> Option<&String> {
        self.extracted
            .get(name)
            .or_else(|| self.environment.get(name))
            .or_else(|| self.global.get(name))
    }

    /// Replaces every `{{name}}` token with its binding, leaving unbound
    /// tokens verbatim. Single pass, so substituted values are not
    /// re-expanded.
    pub fn render(&self, text: &str) -> String {
        token_pattern()
            .replace_all(text, |caps: &Captures| match self.lookup(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Renders map values; keys pass through unchanged.
    pub fn render_map(&self, map: &HashMap<String, String>) -> HashMap<String, String> {
        map.iter()
            .map(|(key, value)| (key.clone(), self.render(value)))
            .collect()
    }

    /// Recursively renders every string leaf; other scalars pass through.
    pub fn render_value(&self, value: &Value) -> Value {
        match value {
            Value::String(text) => Value::String(self.render(text)),
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.render_value(item)).collect())
            }
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), self.render_value(item)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Parses the text as JSON, renders every string leaf and re-serializes.
    /// Text that is not a JSON object or array falls back to plain `render`.
    pub fn render_json_text(&self, text: &str) -> String {
        match serde_json::from_str::<Value>(text) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => {
                self.render_value(&value).to_string()
            }
            _ => self.render(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> VariableContext {
        let mut context = VariableContext::new();
        context.set_global("host", "global.example.com");
        context.set_global("region", "eu");
        context.set_environment("host", "env.example.com");
        context.set_environment("token", "env-token");
        context.set_extracted("token", "extracted-token");
        context
    }

    #[test]
    fn extracted_wins_over_environment_and_global() {
        let context = context();
        assert_eq!(context.render("{{token}}"), "extracted-token");
        assert_eq!(context.render("{{host}}"), "env.example.com");
        assert_eq!(context.render("{{region}}"), "eu");
    }

    #[test]
    fn unbound_tokens_stay_verbatim() {
        let context = context();
        assert_eq!(context.render("x={{missing}}&y={{token}}"), "x={{missing}}&y=extracted-token");
        assert_eq!(context.render("{{}}"), "{{}}");
    }

    #[test]
    fn render_is_idempotent_without_tokens() {
        let context = context();
        let rendered = context.render("/users/{{token}}");
        assert_eq!(context.render(&rendered), rendered);
    }

    #[test]
    fn substituted_values_are_not_re_expanded() {
        let mut context = VariableContext::new();
        context.set_environment("a", "{{b}}");
        context.set_environment("b", "beta");
        assert_eq!(context.render("{{a}}"), "{{b}}");
    }

    #[test]
    fn render_map_keeps_keys() {
        let context = context();
        let map = HashMap::from([("X-{{region}}".to_string(), "Bearer {{token}}".to_string())]);
        let rendered = context.render_map(&map);
        assert_eq!(rendered.get("X-{{region}}"), Some(&"Bearer extracted-token".to_string()));
    }

    #[test]
    fn render_json_text_renders_nested_leaves() {
        let context = context();
        let rendered = context.render_json_text(r#"{"auth":{"token":"{{token}}"},"count":3}"#);
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value, json!({"auth":{"token":"extracted-token"},"count":3}));
    }

    #[test]
    fn render_json_text_falls_back_on_invalid_json() {
        let context = context();
        assert_eq!(context.render_json_text("token={{token}}"), "token=extracted-token");
    }

    #[test]
    fn merge_extracted_overwrites_for_later_renders() {
        let mut context = context();
        context.merge_extracted(HashMap::from([("token".to_string(), "fresh".to_string())]));
        assert_eq!(context.render("{{token}}"), "fresh");
    }
}
