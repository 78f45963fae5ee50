//! Core prompt template trait

use crate::Result;

/// Core trait for prompt templates
///
/// Dyn-compatible: variables are passed as `serde_json::Value`.
pub trait PromptTemplate: Send + Sync {
    /// Get the template name/identifier
    fn name(&self) -> &str;

    /// Render the template with variables
    fn render(&self, vars: &serde_json::Value) -> Result<String>;

    /// Get the raw template source (for debugging/inspection)
    fn raw_template(&self) -> &str;
}
