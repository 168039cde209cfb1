use crate::config::GopConfig;
use crate::error::GopError;
use crate::gop::graph::{compile_linear_hmm, PronunciationGraph};
use crate::gop::viterbi::beam_viterbi;
use crate::model::GopModel;
use crate::pipeline::traits::{
    BestPathSearch, GraphCompiler, LikelihoodSource, SearchOutcome,
};
use crate::types::PhoneId;

/// Compiles a phone transcript into a left-to-right context-dependent HMM chain.
pub struct HmmGraphCompiler {
    pub transition_scale: f32,
}

impl Default for HmmGraphCompiler {
    fn default() -> Self {
        Self {
            transition_scale: GopConfig::DEFAULT_TRANSITION_SCALE,
        }
    }
}

impl GraphCompiler for HmmGraphCompiler {
    fn compile(
        &self,
        model: &GopModel,
        transcript: &[PhoneId],
    ) -> Result<PronunciationGraph, GopError> {
        compile_linear_hmm(model, transcript, self.transition_scale)
    }
}

pub struct BeamViterbiSearch {
    pub beam: f32,
    pub max_active: usize,
}

impl Default for BeamViterbiSearch {
    fn default() -> Self {
        Self {
            beam: GopConfig::DEFAULT_BEAM,
            max_active: usize::MAX,
        }
    }
}

impl BestPathSearch for BeamViterbiSearch {
    fn best_path(
        &self,
        graph: &PronunciationGraph,
        source: &dyn LikelihoodSource,
    ) -> Result<SearchOutcome, GopError> {
        beam_viterbi(graph, source, self.beam, self.max_active)
    }
}
