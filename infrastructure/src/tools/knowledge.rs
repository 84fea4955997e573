//! Knowledge-base tool provider.
//!
//! Keyword-scored lookup over documents handed in at construction time
//! (together with the knowledge-store identifiers from configuration).
//! Scoring counts query-term occurrences; a real deployment would swap
//! in a vector search behind the same descriptor.

use async_trait::async_trait;
use kalendo_domain::{ToolCategory, ToolDescriptor, ToolInvocation, ToolOutcome, ToolParameter};
use serde::{Deserialize, Serialize};

/// Default number of results when the invocation doesn't set `limit`.
const DEFAULT_LIMIT: usize = 3;

/// Maximum snippet length returned per match.
const SNIPPET_BUDGET: usize = 280;

/// A document available for lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// Knowledge lookup over an in-memory document set
pub struct KnowledgeProvider {
    store_ids: Vec<String>,
    documents: Vec<KnowledgeDocument>,
}

impl KnowledgeProvider {
    pub fn new(store_ids: Vec<String>, documents: Vec<KnowledgeDocument>) -> Self {
        Self {
            store_ids,
            documents,
        }
    }

    /// Identifiers of the stores this provider serves
    pub fn store_ids(&self) -> &[String] {
        &self.store_ids
    }

    fn search(&self, invocation: &ToolInvocation) -> ToolOutcome {
        let query = match invocation.require_string("query") {
            Ok(q) => q.to_lowercase(),
            Err(e) => return ToolOutcome::failure(e),
        };
        let limit = invocation
            .get_i64("limit")
            .map(|l| l.max(1) as usize)
            .unwrap_or(DEFAULT_LIMIT);

        let terms: Vec<&str> = query.split_whitespace().collect();
        if terms.is_empty() {
            return ToolOutcome::failure("Query must contain at least one term");
        }

        let mut scored: Vec<(usize, &KnowledgeDocument)> = self
            .documents
            .iter()
            .filter_map(|doc| {
                let haystack = format!("{} {}", doc.title, doc.content).to_lowercase();
                let score: usize = terms.iter().map(|t| haystack.matches(t).count()).sum();
                (score > 0).then_some((score, doc))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let results: Vec<serde_json::Value> = scored
            .into_iter()
            .take(limit)
            .map(|(score, doc)| {
                serde_json::json!({
                    "id": doc.id,
                    "title": doc.title,
                    "snippet": kalendo_domain::truncate(&doc.content, SNIPPET_BUDGET),
                    "score": score,
                })
            })
            .collect();

        ToolOutcome::success(serde_json::json!(results))
    }
}

#[async_trait]
impl ToolProvider for KnowledgeProvider {
    fn id(&self) -> &str {
        "knowledge"
    }

    fn descriptors(&self) -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor::new(
                "search_knowledge",
                "Look up reference material in the knowledge base",
                ToolCategory::Knowledge,
            )
            .with_parameter(ToolParameter::new("query", "Search terms", true))
            .with_parameter(
                ToolParameter::new("limit", "Maximum results to return", false).with_type("number"),
            ),
        ]
    }

    async fn execute(&self, invocation: &ToolInvocation) -> ToolOutcome {
        match invocation.tool_name.as_str() {
            "search_knowledge" => self.search(invocation),
            other => ToolOutcome::failure(format!("Unknown knowledge tool: {}", other)),
        }
    }
}
