//! Streaming Response Builder
//!
//! Re-renders a compiled answer as an ordered sequence of chunks: the
//! acknowledgment first, an overview (domain, confidence and any degraded
//! notice) when there is one, then one chunk per section.

use legal_agent_core::Intent;
use serde::{Deserialize, Serialize};

use crate::compiler::{CompiledResponse, SectionKind};

/// What a chunk carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Acknowledgment,
    Overview,
    Section,
}

/// One piece of a streamed answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseChunk {
    pub index: usize,
    pub kind: ChunkKind,
    /// Set only for `ChunkKind::Section`
    pub section: Option<SectionKind>,
    pub text: String,
}

/// Finite, single-use chunk sequence
#[derive(Debug)]
pub struct ResponseChunks {
    inner: std::vec::IntoIter<ResponseChunk>,
}

impl Iterator for ResponseChunks {
    type Item = ResponseChunk;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ResponseChunks {}

#[derive(Debug, Clone, Copy, Default)]
pub struct StreamingResponseBuilder;

impl StreamingResponseBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, response: &CompiledResponse) -> ResponseChunks {
        let mut chunks = vec![ResponseChunk {
            index: 0,
            kind: ChunkKind::Acknowledgment,
            section: None,
            text: response.acknowledgment.clone(),
        }];

        if response.intent == Intent::Substantive {
            if let Some(overview) = response.overview() {
                chunks.push(ResponseChunk {
                    index: chunks.len(),
                    kind: ChunkKind::Overview,
                    section: None,
                    text: overview,
                });
            }
            for section in &response.sections {
                let body = format!("**{}:**\n{}", section.label, section.body);
                let text = match response.sources_block() {
                    Some(sources) if section.kind == SectionKind::Disclaimer => {
                        format!("{}\n\n{}", sources, body)
                    }
                    _ => body,
                };
                chunks.push(ResponseChunk {
                    index: chunks.len(),
                    kind: ChunkKind::Section,
                    section: Some(section.kind),
                    text,
                });
            }
        }

        ResponseChunks {
            inner: chunks.into_iter(),
        }
    }
}
