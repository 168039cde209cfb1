pub mod context_tree;
pub mod decodable;
pub mod transition;

use std::sync::Arc;

use crate::error::GopError;
use crate::gop::context::ContextResolver;
use crate::pipeline::traits::ContextTree;
use crate::types::PhoneId;

pub use context_tree::{TableContextTree, TreeEntry};
pub use decodable::DecodableMatrix;
pub use transition::{TopologyEntry, TransitionEntry, TransitionModel};

/// Acoustic model state shared read-only by every utterance of a batch.
pub struct GopModel {
    transitions: Arc<TransitionModel>,
    resolver: ContextResolver,
}

impl GopModel {
    pub fn new(
        tree: Arc<dyn ContextTree>,
        transitions: Arc<TransitionModel>,
    ) -> Result<Self, GopError> {
        let resolver = ContextResolver::new(tree, &transitions)?;
        Ok(Self {
            transitions,
            resolver,
        })
    }

    pub fn transitions(&self) -> &TransitionModel {
        &self.transitions
    }

    pub fn shared_transitions(&self) -> Arc<TransitionModel> {
        Arc::clone(&self.transitions)
    }

    pub fn resolver(&self) -> &ContextResolver {
        &self.resolver
    }

    pub fn phones(&self) -> &[PhoneId] {
        self.transitions.phones()
    }
}
