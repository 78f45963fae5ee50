//! Fixtures shared by the workflow tests

use esg_agents::AgentContext;
use esg_llm::testing::ScriptedProvider;
use esg_sources::testing::StaticSource;
use esg_sources::{RawArticle, SourceHub};
use std::sync::Arc;

/// Context with no articles and every prompt registered
pub(crate) fn context(provider: ScriptedProvider) -> AgentContext {
    context_with(provider, Vec::new())
}

pub(crate) fn context_with(provider: ScriptedProvider, articles: Vec<RawArticle>) -> AgentContext {
    let hub = SourceHub::new(vec![Arc::new(StaticSource::new("wire", articles))]);
    let ctx = AgentContext::new(provider.into_clients(), hub).unwrap();
    crate::prompts::register_prompts(ctx.prompts()).unwrap();
    ctx
}
