//! MiniJinja-based template implementation

use crate::{PromptError, PromptTemplate, Result};
use minijinja::{Environment, UndefinedBehavior};

/// A prompt template backed by MiniJinja
///
/// The source is parsed once at construction so syntax errors surface at
/// registration time. Rendering is strict: referencing a variable that was not
/// supplied is an error rather than an empty string.
///
/// Besides the MiniJinja built-ins, templates can use `clip(n)`, which keeps
/// the first `n` characters of a string.
pub struct JinjaTemplate {
    name: String,
    source: String,
}

impl JinjaTemplate {
    /// Create and validate a template
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let template = Self {
            name: name.into(),
            source: source.into(),
        };

        environment()
            .template_from_str(&template.source)
            .map_err(|e| PromptError::TemplateParseFailed {
                name: template.name.clone(),
                detail: e.to_string(),
            })?;

        Ok(template)
    }
}

fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.add_filter("clip", |s: String, n: usize| s.chars().take(n).collect::<String>());
    env
}

impl PromptTemplate for JinjaTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, vars: &serde_json::Value) -> Result<String> {
        let value = minijinja::Value::from_serialize(vars);

        environment()
            .render_str(&self.source, value)
            .map_err(|e| PromptError::RenderError {
                name: self.name.clone(),
                detail: e.to_string(),
            })
    }

    fn raw_template(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Debug for JinjaTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JinjaTemplate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_simple_template() {
        let template = JinjaTemplate::new("test", "Claim by {{ company }}").unwrap();
        let result = template.render(&json!({ "company": "Shell" })).unwrap();
        assert_eq!(result, "Claim by Shell");
    }

    #[test]
    fn test_invalid_template_error() {
        let result = JinjaTemplate::new("test", "{{ unclosed");
        assert!(matches!(result, Err(PromptError::TemplateParseFailed { .. })));
    }

    #[test]
    fn test_missing_variable_is_error() {
        let template = JinjaTemplate::new("test", "{{ company }}").unwrap();
        let result = template.render(&json!({}));
        assert!(matches!(result, Err(PromptError::RenderError { .. })));
    }

    #[test]
    fn test_clip_filter() {
        let template = JinjaTemplate::new("test", "{{ text | clip(5) }}").unwrap();
        let result = template.render(&json!({ "text": "sustainability" })).unwrap();
        assert_eq!(result, "susta");
    }

    #[test]
    fn test_loop_and_conditional() {
        let template = JinjaTemplate::new(
            "test",
            "{% for e in evidence %}- {{ e.source }}{% if e.note %} ({{ e.note }}){% endif %}\n{% endfor %}",
        )
        .unwrap();

        let result = template
            .render(&json!({
                "evidence": [
                    { "source": "Reuters", "note": "Tier-1" },
                    { "source": "Blog", "note": null }
                ]
            }))
            .unwrap();
        assert_eq!(result, "- Reuters (Tier-1)\n- Blog\n");
    }

    #[test]
    fn test_debug() {
        let template = JinjaTemplate::new("esg.test", "Hello").unwrap();
        assert!(format!("{template:?}").contains("esg.test"));
        assert_eq!(template.raw_template(), "Hello");
    }
}
