use std::sync::Arc;

use crate::error::GopError;
use crate::gop::likelihood::SegmentLikelihoodEngine;
use crate::gop::reconcile::reconcile_frame_counts;
use crate::gop::segments::{build_segments, segments_from_alignment};
use crate::model::GopModel;
use crate::pipeline::traits::{BestPathSearch, GraphCompiler, LikelihoodSource};
use crate::types::{AlignedGopOutput, GopInput, GopOutput, PhoneId, Segment};

/// Per-utterance GOP driver. Holds only shared read-only state, so one scorer can serve
/// many utterances, including from several threads.
pub struct GopScorer {
    model: Arc<GopModel>,
    graph_compiler: Box<dyn GraphCompiler>,
    best_path: Box<dyn BestPathSearch>,
}

pub(crate) struct GopScorerParts {
    pub model: Arc<GopModel>,
    pub graph_compiler: Box<dyn GraphCompiler>,
    pub best_path: Box<dyn BestPathSearch>,
}

impl GopScorer {
    pub(crate) fn from_parts(parts: GopScorerParts) -> Self {
        Self {
            model: parts.model,
            graph_compiler: parts.graph_compiler,
            best_path: parts.best_path,
        }
    }

    pub fn model(&self) -> &GopModel {
        &self.model
    }

    /// Scores an externally segmented utterance.
    ///
    /// Frame counts are first reconciled against `source.num_frames()`.
    pub fn compute(
        &self,
        source: &dyn LikelihoodSource,
        input: &GopInput,
    ) -> Result<GopOutput, GopError> {
        if input.phones.len() != input.frame_counts.len() {
            return Err(GopError::invalid_input(format!(
                "{} phones but {} frame counts",
                input.phones.len(),
                input.frame_counts.len()
            )));
        }
        if input.phones.is_empty() {
            return Ok(GopOutput::default());
        }

        let mut frame_counts = input.frame_counts.clone();
        reconcile_frame_counts(&mut frame_counts, source.num_frames());
        let segments = build_segments(&input.phones, &frame_counts)?;

        let engine = SegmentLikelihoodEngine::new(&self.model);
        let scores = segments
            .iter()
            .enumerate()
            .map(|(i, seg)| {
                let score = engine.score(seg, source)?;
                log_segment(i, seg, score);
                Ok(score)
            })
            .collect::<Result<Vec<_>, GopError>>()?;

        Ok(GopOutput {
            phones: input.phones.clone(),
            scores,
            segments,
        })
    }

    /// Derives the segmentation by forced alignment of `transcript`, then scores it.
    pub fn compute_aligned(
        &self,
        source: &dyn LikelihoodSource,
        transcript: &[PhoneId],
    ) -> Result<AlignedGopOutput, GopError> {
        let graph = self.graph_compiler.compile(&self.model, transcript)?;
        let outcome = self.best_path.best_path(&graph, source)?;
        tracing::debug!(
            num_frames = source.num_frames(),
            graph_states = graph.num_states(),
            path_score = outcome.score,
            reached_final = outcome.reached_final,
            "forced alignment finished"
        );

        let segments = segments_from_alignment(&outcome.alignment, self.model.transitions());
        let engine = SegmentLikelihoodEngine::new(&self.model);
        let mut scores = Vec::with_capacity(segments.len());
        let mut phone_log_likelihoods = Vec::with_capacity(segments.len());
        for (i, seg) in segments.iter().enumerate() {
            let scored = engine.score_segment(seg, source)?;
            log_segment(i, seg, scored.gop);
            scores.push(scored.gop);
            phone_log_likelihoods.push(scored.numerator);
        }

        Ok(AlignedGopOutput {
            gop: GopOutput {
                phones: segments.iter().map(|s| s.phone).collect(),
                scores,
                segments,
            },
            phone_log_likelihoods,
            alignment: outcome.alignment,
            reached_final: outcome.reached_final,
        })
    }
}

fn log_segment(index: usize, segment: &Segment, score: f32) {
    tracing::debug!(
        index,
        phone = segment.phone,
        left = segment.left_context,
        right = segment.right_context,
        start_frame = segment.start_frame,
        frame_count = segment.frame_count,
        gop = format!("{score:.4}"),
        "gop: segment scored"
    );
}
