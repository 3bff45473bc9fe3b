use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::storage::json_seq_store::JsonSeqStore;

/// One stored code snippet: the code body, its prose explanation, and
/// optional per-line notes keyed by stringified line number.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CodeBlock {
    pub id: u64,
    pub title: String,
    pub category: String,
    pub code: String,
    pub explanation: String,
    #[serde(rename = "lineExplanations", default)]
    pub line_explanations: HashMap<String, String>,
}

/// Creation input: everything but the id, which the store assigns.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CodeBlockDraft {
    pub title: String,
    pub category: String,
    pub code: String,
    pub explanation: String,
    #[serde(rename = "lineExplanations", default)]
    pub line_explanations: HashMap<String, String>,
}

/// Partial update: only fields present in the payload overwrite the record.
/// An omitted (or null) field keeps its prior value; a field explicitly set
/// to an empty string or empty map overwrites.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CodeBlockPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(rename = "lineExplanations", default)]
    pub line_explanations: Option<HashMap<String, String>>,
}

impl CodeBlockPatch {
    fn apply(self, block: &mut CodeBlock) {
        if let Some(title) = self.title {
            block.title = title;
        }
        if let Some(category) = self.category {
            block.category = category;
        }
        if let Some(code) = self.code {
            block.code = code;
        }
        if let Some(explanation) = self.explanation {
            block.explanation = explanation;
        }
        if let Some(line_explanations) = self.line_explanations {
            block.line_explanations = line_explanations;
        }
    }
}

/// File store: persists the full code block collection as one JSON array,
/// in creation order.
pub struct CodeBlockStore {
    store: Arc<JsonSeqStore<CodeBlock>>,
}

impl CodeBlockStore {
    /// Initialize the store, creating an empty data file if none exists.
    pub async fn new<P: Into<std::path::PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonSeqStore::<CodeBlock>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }

    /// One past the current maximum id, or 1 when the collection is empty.
    /// Ids are never reused while present; deleting the max frees its slot.
    fn next_id(blocks: &[CodeBlock]) -> u64 {
        blocks.iter().map(|b| b.id).max().map_or(1, |max| max + 1)
    }

    /// List every block in creation order.
    pub async fn list(&self) -> Result<Vec<CodeBlock>, ServiceError> {
        self.store.snapshot().await
    }

    /// Get a block by id.
    pub async fn get(&self, id: u64) -> Result<CodeBlock, ServiceError> {
        let blocks = self.store.snapshot().await?;
        blocks
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| ServiceError::not_found("code block"))
    }

    /// Append a new block with a freshly assigned id and persist.
    pub async fn create(&self, draft: CodeBlockDraft) -> Result<CodeBlock, ServiceError> {
        self.store
            .mutate(|blocks| {
                let block = CodeBlock {
                    id: Self::next_id(blocks),
                    title: draft.title,
                    category: draft.category,
                    code: draft.code,
                    explanation: draft.explanation,
                    line_explanations: draft.line_explanations,
                };
                blocks.push(block.clone());
                Ok(block)
            })
            .await
    }

    /// Overwrite only the fields present in the patch and persist.
    pub async fn update(&self, id: u64, patch: CodeBlockPatch) -> Result<CodeBlock, ServiceError> {
        self.store
            .mutate(|blocks| {
                let block = blocks
                    .iter_mut()
                    .find(|b| b.id == id)
                    .ok_or_else(|| ServiceError::not_found("code block"))?;
                patch.apply(block);
                Ok(block.clone())
            })
            .await
    }

    /// Remove the block with the given id and persist; returns the removed record.
    pub async fn delete(&self, id: u64) -> Result<CodeBlock, ServiceError> {
        self.store
            .mutate(|blocks| {
                let idx = blocks
                    .iter()
                    .position(|b| b.id == id)
                    .ok_or_else(|| ServiceError::not_found("code block"))?;
                Ok(blocks.remove(idx))
            })
            .await
    }

    /// Distinct category values across the collection; order is unspecified.
    pub async fn categories(&self) -> Result<Vec<String>, ServiceError> {
        let blocks = self.store.snapshot().await?;
        let set: HashSet<String> = blocks.into_iter().map(|b| b.category).collect();
        Ok(set.into_iter().collect())
    }
}
