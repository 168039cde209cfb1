use std::collections::HashMap;
use std::sync::Arc;

use crate::error::GopError;
use crate::model::transition::TransitionModel;
use crate::pipeline::traits::ContextTree;
use crate::types::{PdfId, PhoneContext, StateId, SubStateClass};

/// Resolves a phone context and pdf class to a state id the likelihood source accepts.
pub struct ContextResolver {
    tree: Arc<dyn ContextTree>,
    /// One representative state id per pdf. Several ids share a pdf and read the same
    /// likelihood, so which one is kept does not matter; the last in table order wins.
    pdf_to_state: HashMap<PdfId, StateId>,
}

impl ContextResolver {
    pub fn new(tree: Arc<dyn ContextTree>, transitions: &TransitionModel) -> Result<Self, GopError> {
        if tree.context_width() != PhoneContext::WIDTH
            || tree.central_position() != PhoneContext::CENTER_POSITION
        {
            return Err(GopError::configuration(format!(
                "context tree must have width {} and central position {}, got width {} and central position {}",
                PhoneContext::WIDTH,
                PhoneContext::CENTER_POSITION,
                tree.context_width(),
                tree.central_position()
            )));
        }

        let mut pdf_to_state = HashMap::new();
        for tid in 0..transitions.num_transition_ids() as StateId {
            if let Some(pdf) = transitions.transition_id_to_pdf(tid) {
                pdf_to_state.insert(pdf, tid);
            }
        }
        tracing::debug!(
            num_transition_ids = transitions.num_transition_ids(),
            num_represented_pdfs = pdf_to_state.len(),
            "context resolver: built pdf representative table"
        );

        Ok(Self { tree, pdf_to_state })
    }

    pub fn resolve_pdf(
        &self,
        context: &PhoneContext,
        pdf_class: SubStateClass,
    ) -> Result<PdfId, GopError> {
        let window = context.window();
        self.tree.compute(&window, pdf_class).ok_or_else(|| {
            GopError::state_resolution(window, pdf_class, "context tree has no leaf")
        })
    }

    pub fn resolve(
        &self,
        context: &PhoneContext,
        pdf_class: SubStateClass,
    ) -> Result<StateId, GopError> {
        let pdf = self.resolve_pdf(context, pdf_class)?;
        self.pdf_to_state.get(&pdf).copied().ok_or_else(|| {
            GopError::state_resolution(
                context.window(),
                pdf_class,
                format!("pdf {pdf} is not used by any transition"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::context_tree::{TableContextTree, TreeEntry};
    use crate::model::transition::{TopologyEntry, TransitionEntry};

    fn transitions() -> TransitionModel {
        let t = |phone, pdf, self_loop| TransitionEntry {
            phone,
            hmm_state: 0,
            pdf,
            self_loop,
            log_prob: 0.0,
        };
        TransitionModel::new(
            vec![1, 2],
            3,
            vec![
                TopologyEntry {
                    phone: 1,
                    num_pdf_classes: 1,
                },
                TopologyEntry {
                    phone: 2,
                    num_pdf_classes: 1,
                },
            ],
            vec![t(1, 0, true), t(1, 0, false), t(2, 1, true), t(2, 1, false)],
        )
        .expect("transitions")
    }

    fn leaf(center: u32, pdf: PdfId) -> TreeEntry {
        TreeEntry {
            left: None,
            center,
            right: None,
            pdf_class: 0,
            pdf,
        }
    }

    #[test]
    fn resolves_last_transition_of_each_pdf() {
        let tree = TableContextTree::triphone(vec![leaf(1, 0), leaf(2, 1)]).expect("tree");
        let resolver = ContextResolver::new(Arc::new(tree), &transitions()).expect("resolver");
        assert_eq!(resolver.resolve(&PhoneContext::new(1, 1, 1), 0).unwrap(), 1);
        assert_eq!(resolver.resolve(&PhoneContext::new(1, 2, 1), 0).unwrap(), 3);
    }

    #[test]
    fn rejects_non_triphone_tree() {
        let tree = TableContextTree::new(1, 0, vec![leaf(1, 0)]).expect("tree");
        let result = ContextResolver::new(Arc::new(tree), &transitions());
        assert!(matches!(result, Err(GopError::Configuration { .. })));

        let tree = TableContextTree::new(3, 2, vec![leaf(1, 0)]).expect("tree");
        let result = ContextResolver::new(Arc::new(tree), &transitions());
        assert!(matches!(result, Err(GopError::Configuration { .. })));
    }

    #[test]
    fn missing_leaf_is_a_resolution_error() {
        let tree = TableContextTree::triphone(vec![leaf(1, 0)]).expect("tree");
        let resolver = ContextResolver::new(Arc::new(tree), &transitions()).expect("resolver");
        let err = resolver.resolve(&PhoneContext::new(1, 2, 1), 0).unwrap_err();
        assert!(matches!(err, GopError::StateResolution { center: 2, .. }));
    }

    #[test]
    fn pdf_without_transition_is_a_resolution_error() {
        let tree = TableContextTree::triphone(vec![leaf(1, 2)]).expect("tree");
        let resolver = ContextResolver::new(Arc::new(tree), &transitions()).expect("resolver");
        assert_eq!(resolver.resolve_pdf(&PhoneContext::new(1, 1, 1), 0).unwrap(), 2);
        assert!(matches!(
            resolver.resolve(&PhoneContext::new(1, 1, 1), 0),
            Err(GopError::StateResolution { .. })
        ));
    }
}
