use crate::error::GopError;
use crate::model::GopModel;
use crate::pipeline::traits::LikelihoodSource;
use crate::types::{PhoneContext, PhoneId, Segment, StateId};

/// Terms further than this below the per-frame maximum are dropped from the sum.
pub const LOG_SUM_EXP_PRUNE: f32 = 5.0;

/// Starting point of the competing-phone maximum; any real candidate beats it.
pub const DENOMINATOR_FLOOR: f32 = -10_000_000.0;

/// ln(f32::EPSILON): below this relative to the max a term cannot change an f32 sum.
const MIN_LOG_DIFF_F32: f32 = -15.942_385;

/// `max + ln(sum(exp(v - max)))` over the values within `prune` of the max.
///
/// A non-positive `prune` keeps every term that can still affect the result.
pub fn log_sum_exp_pruned(values: &[f32], prune: f32) -> f32 {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return max;
    }
    let cutoff = if prune > 0.0 {
        max - prune
    } else {
        max + MIN_LOG_DIFF_F32
    };
    let sum_relative_to_max: f64 = values
        .iter()
        .copied()
        .filter(|&v| v >= cutoff)
        .map(|v| f64::from(v - max).exp())
        .sum();
    max + sum_relative_to_max.ln() as f32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentScore {
    pub gop: f32,
    /// Log-likelihood of the intended phone over the segment.
    pub numerator: f32,
    /// Best log-likelihood over every phone of the inventory in the same context.
    pub denominator: f32,
}

impl SegmentScore {
    const EMPTY: Self = Self {
        gop: 0.0,
        numerator: 0.0,
        denominator: 0.0,
    };
}

/// Numerator/denominator computation of the GOP statistic for one segment.
///
/// Neither side includes the acoustic feature prior; it cancels in the difference, which
/// is the only meaningful quantity.
pub struct SegmentLikelihoodEngine<'m> {
    model: &'m GopModel,
}

impl<'m> SegmentLikelihoodEngine<'m> {
    pub fn new(model: &'m GopModel) -> Self {
        Self { model }
    }

    pub fn numerator_likelihood(
        &self,
        segment: &Segment,
        source: &dyn LikelihoodSource,
    ) -> Result<f32, GopError> {
        self.phone_log_likelihood(segment.context(), segment, source)
    }

    /// Maximum over the whole phone inventory, the segment's own phone included.
    pub fn max_competing_likelihood(
        &self,
        segment: &Segment,
        source: &dyn LikelihoodSource,
    ) -> Result<f32, GopError> {
        let context = segment.context();
        let mut best = DENOMINATOR_FLOOR;
        for &phone in self.model.phones() {
            let candidate =
                self.phone_log_likelihood(context.with_center(phone), segment, source)?;
            if candidate > best {
                best = candidate;
            }
        }
        Ok(best)
    }

    pub fn score(&self, segment: &Segment, source: &dyn LikelihoodSource) -> Result<f32, GopError> {
        self.score_segment(segment, source).map(|s| s.gop)
    }

    /// Zero-frame segments carry no evidence and score 0 without touching the model.
    pub fn score_segment(
        &self,
        segment: &Segment,
        source: &dyn LikelihoodSource,
    ) -> Result<SegmentScore, GopError> {
        if segment.frame_count == 0 {
            return Ok(SegmentScore::EMPTY);
        }
        let numerator = self.numerator_likelihood(segment, source)?;
        let denominator = self.max_competing_likelihood(segment, source)?;
        Ok(SegmentScore {
            gop: (numerator - denominator) / segment.frame_count as f32,
            numerator,
            denominator,
        })
    }

    fn phone_log_likelihood(
        &self,
        context: PhoneContext,
        segment: &Segment,
        source: &dyn LikelihoodSource,
    ) -> Result<f32, GopError> {
        if segment.end_frame() > source.num_frames() {
            return Err(GopError::invalid_input(format!(
                "segment frames [{}, {}) exceed the {} available",
                segment.start_frame,
                segment.end_frame(),
                source.num_frames()
            )));
        }
        let states = self.context_states(context)?;
        let mut frame_scores = vec![0.0f32; states.len()];
        let mut likelihood = 0.0f32;
        for frame in segment.start_frame..segment.end_frame() {
            for (score, &state) in frame_scores.iter_mut().zip(&states) {
                *score = source.log_likelihood(frame, state);
            }
            likelihood += log_sum_exp_pruned(&frame_scores, LOG_SUM_EXP_PRUNE);
        }
        Ok(likelihood)
    }

    fn context_states(&self, context: PhoneContext) -> Result<Vec<StateId>, GopError> {
        let num_classes = self.pdf_class_count(context.center)?;
        let resolver = self.model.resolver();
        (0..num_classes)
            .map(|pdf_class| resolver.resolve(&context, pdf_class))
            .collect()
    }

    fn pdf_class_count(&self, phone: PhoneId) -> Result<usize, GopError> {
        self.model
            .transitions()
            .num_pdf_classes(phone)
            .ok_or_else(|| GopError::invalid_input(format!("phone {phone} is not in the topology")))
    }
}
