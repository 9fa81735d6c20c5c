//! Token vocabulary.
//!
//! IDs are assigned in sorted token order, so building the vocabulary from
//! the same corpus always yields the same mapping.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::error::{ErrorCode, PipelineError, Result};

/// Bijection between corpus tokens and dense integer IDs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vocabulary {
    token_to_id: BTreeMap<String, usize>,
    id_to_token: Vec<String>,
}

impl Vocabulary {
    /// Builds the vocabulary of a whitespace-separated corpus.
    pub fn from_corpus(corpus: &str) -> Self {
        let tokens: BTreeSet<&str> = corpus.split_whitespace().collect();
        Self::from_sorted_tokens(tokens.into_iter().map(str::to_string).collect())
    }

    fn from_sorted_tokens(id_to_token: Vec<String>) -> Self {
        let token_to_id = id_to_token
            .iter()
            .enumerate()
            .map(|(id, token)| (token.clone(), id))
            .collect();
        Self {
            token_to_id,
            id_to_token,
        }
    }

    /// Loads a mapping file written by [`Vocabulary::save`].
    ///
    /// The IDs must be exactly `0..len`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| PipelineError::io("read", path, e))?;
        let token_to_id: BTreeMap<String, usize> = serde_json::from_str(&content).map_err(|e| {
            PipelineError::with_source(
                ErrorCode::UnknownToken,
                format!("Failed to parse mapping file {}", path.display()),
                e,
            )
        })?;

        let mut id_to_token = vec![None; token_to_id.len()];
        for (token, &id) in &token_to_id {
            let slot = id_to_token
                .get_mut(id)
                .filter(|slot| slot.is_none())
                .ok_or_else(|| {
                    PipelineError::unknown_token(format!(
                        "{} has duplicate or out-of-range id {}",
                        token, id
                    ))
                })?;
            *slot = Some(token.clone());
        }

        Ok(Self {
            token_to_id,
            id_to_token: id_to_token.into_iter().flatten().collect(),
        })
    }

    /// Writes the mapping as pretty-printed JSON (token → id, 4-space indent).
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.token_to_id.serialize(&mut serializer).map_err(|e| {
            PipelineError::with_source(
                ErrorCode::Io,
                "Failed to serialize mapping",
                e,
            )
        })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| PipelineError::io("create directory", parent, e))?;
            }
        }
        fs::write(path, buffer).map_err(|e| PipelineError::io("write", path, e))
    }

    /// ID of a token.
    pub fn id(&self, token: &str) -> Result<usize> {
        self.token_to_id
            .get(token)
            .copied()
            .ok_or_else(|| PipelineError::unknown_token(token))
    }

    /// Token for an ID.
    pub fn token(&self, id: usize) -> Option<&str> {
        self.id_to_token.get(id).map(String::as_str)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    /// Returns true if the vocabulary has no tokens.
    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }

    /// Tokens in ID order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.id_to_token.iter().map(String::as_str)
    }
}

/// Builds the vocabulary of `corpus` and persists it to `mapping_path`.
pub fn create_mapping(corpus: &str, mapping_path: &Path) -> Result<Vocabulary> {
    let vocabulary = Vocabulary::from_corpus(corpus);
    vocabulary.save(mapping_path)?;
    info!(
        "wrote vocabulary of {} tokens to {}",
        vocabulary.len(),
        mapping_path.display()
    );
    Ok(vocabulary)
}

/// Maps every token of the corpus to its ID.
pub fn convert_songs_to_int(corpus: &str, vocabulary: &Vocabulary) -> Result<Vec<usize>> {
    corpus
        .split_whitespace()
        .map(|token| vocabulary.id(token))
        .collect()
}
