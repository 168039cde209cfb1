use crate::error::GopError;
use crate::gop::graph::PronunciationGraph;
use crate::model::GopModel;
use crate::types::{PdfId, PhoneId, StateId, SubStateClass};

/// Context-dependency lookup: phone window plus pdf class to pdf.
pub trait ContextTree: Send + Sync {
    fn context_width(&self) -> usize;
    fn central_position(&self) -> usize;
    /// `None` when the tree has no answer for this window (e.g. unseen context).
    fn compute(&self, phone_window: &[PhoneId], pdf_class: SubStateClass) -> Option<PdfId>;
}

/// Per-frame acoustic scores for one utterance.
///
/// Values are scaled log-likelihoods (posterior over prior); they are not normalized and
/// can exceed zero.
pub trait LikelihoodSource {
    fn num_frames(&self) -> usize;
    fn log_likelihood(&self, frame: usize, state: StateId) -> f32;
}

pub trait GraphCompiler: Send + Sync {
    fn compile(
        &self,
        model: &GopModel,
        transcript: &[PhoneId],
    ) -> Result<PronunciationGraph, GopError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// One state id per frame.
    pub alignment: Vec<StateId>,
    /// Total path log-likelihood, graph weights included.
    pub score: f32,
    pub reached_final: bool,
}

pub trait BestPathSearch: Send + Sync {
    fn best_path(
        &self,
        graph: &PronunciationGraph,
        source: &dyn LikelihoodSource,
    ) -> Result<SearchOutcome, GopError>;
}
