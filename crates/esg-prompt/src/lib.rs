//! Prompt template management for the ESG greenwashing detector
//!
//! Prompts are Jinja2 templates rendered by MiniJinja and looked up by name in
//! a thread-safe [`PromptRegistry`].
//!
//! ```
//! use esg_prompt::{JinjaTemplate, PromptRegistry};
//! use serde_json::json;
//!
//! let registry = PromptRegistry::new();
//! registry.register(JinjaTemplate::new("esg.greeting", "Analyze {{ company }}").unwrap());
//!
//! let prompt = registry.render("esg.greeting", &json!({ "company": "BP" })).unwrap();
//! assert_eq!(prompt, "Analyze BP");
//! ```

mod error;
mod jinja;
mod registry;
mod template;

pub use error::{PromptError, Result};
pub use jinja::JinjaTemplate;
pub use registry::PromptRegistry;
pub use template::PromptTemplate;
