#![allow(dead_code)]

use std::sync::Arc;

use dnn_gop::model::{TopologyEntry, TransitionEntry, TreeEntry};
use dnn_gop::{
    ContextTree, GopConfig, GopScorer, GopScorerBuilder, PhoneContext, PhoneId, TableContextTree,
    TransitionModel,
};
use rand::rngs::StdRng;
use rand::Rng;

/// Silence (1), two three-state phones (2, 3) and a one-state phone (4).
pub const TOPOLOGY: [(PhoneId, usize); 4] = [(1, 1), (2, 3), (3, 3), (4, 1)];

/// Phone 2 between silence and phone 3 gets its own middle-state pdf.
pub const TRIPHONE_LEAVES: [(PhoneId, PhoneId, PhoneId, usize); 1] = [(1, 2, 3, 1)];

pub struct ModelParts {
    pub transitions: Arc<TransitionModel>,
    pub tree: Arc<TableContextTree>,
}

/// One monophone leaf per (phone, class), plus the given triphone leaves, each with its
/// own pdf and a self-loop/forward transition pair of probability 0.5.
pub fn model_parts(
    topology: &[(PhoneId, usize)],
    triphone_leaves: &[(PhoneId, PhoneId, PhoneId, usize)],
    untreed_phone: Option<PhoneId>,
) -> ModelParts {
    let mut entries = Vec::new();
    let mut transitions = Vec::new();
    let mut next_pdf = 0u32;
    let mut add_leaf = |left: Option<PhoneId>, center: PhoneId, right: Option<PhoneId>, class| {
        let pdf = next_pdf;
        next_pdf += 1;
        if Some(center) != untreed_phone {
            entries.push(TreeEntry {
                left,
                center,
                right,
                pdf_class: class,
                pdf,
            });
        }
        for self_loop in [true, false] {
            transitions.push(TransitionEntry {
                phone: center,
                hmm_state: class,
                pdf,
                self_loop,
                log_prob: 0.5f32.ln(),
            });
        }
    };
    for &(phone, classes) in topology {
        for class in 0..classes {
            add_leaf(None, phone, None, class);
        }
    }
    for &(left, center, right, class) in triphone_leaves {
        add_leaf(Some(left), center, Some(right), class);
    }
    let num_pdfs = next_pdf as usize;

    let transitions = TransitionModel::new(
        topology.iter().map(|&(p, _)| p).collect(),
        num_pdfs,
        topology
            .iter()
            .map(|&(phone, num_pdf_classes)| TopologyEntry {
                phone,
                num_pdf_classes,
            })
            .collect(),
        transitions,
    )
    .expect("fixture transition model");
    let tree = TableContextTree::triphone(entries).expect("fixture tree");
    ModelParts {
        transitions: Arc::new(transitions),
        tree: Arc::new(tree),
    }
}

pub fn scorer_for(parts: &ModelParts) -> GopScorer {
    GopScorerBuilder::new(GopConfig::default())
        .with_transition_model(Arc::clone(&parts.transitions))
        .with_context_tree(parts.tree.clone())
        .build()
        .expect("fixture scorer")
}

pub fn default_parts() -> ModelParts {
    model_parts(&TOPOLOGY, &TRIPHONE_LEAVES, None)
}

pub fn pdf_of(parts: &ModelParts, context: PhoneContext, class: usize) -> usize {
    parts
        .tree
        .compute(&context.window(), class)
        .expect("fixture leaf") as usize
}

pub fn random_log_likes(rng: &mut StdRng, frames: usize, num_pdfs: usize) -> Vec<Vec<f32>> {
    (0..frames)
        .map(|_| (0..num_pdfs).map(|_| rng.gen_range(-12.0f32..2.0)).collect())
        .collect()
}
