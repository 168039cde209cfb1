use std::sync::Arc;

use crate::error::GopError;
use crate::model::transition::TransitionModel;
use crate::pipeline::traits::LikelihoodSource;
use crate::types::StateId;

/// Frame x pdf log-likelihood matrix addressed through transition-level state ids.
#[derive(Debug, Clone)]
pub struct DecodableMatrix {
    transitions: Arc<TransitionModel>,
    log_likes: Vec<Vec<f32>>,
}

impl DecodableMatrix {
    pub fn new(
        transitions: Arc<TransitionModel>,
        log_likes: Vec<Vec<f32>>,
    ) -> Result<Self, GopError> {
        let num_pdfs = transitions.num_pdfs();
        if let Some((frame, row)) = log_likes
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != num_pdfs)
        {
            return Err(GopError::invalid_input(format!(
                "frame {frame} has {} scores, model has {num_pdfs} pdfs",
                row.len()
            )));
        }
        Ok(Self {
            transitions,
            log_likes,
        })
    }

    /// Converts network log-posteriors to scaled log-likelihoods by subtracting log priors.
    pub fn from_log_posteriors(
        transitions: Arc<TransitionModel>,
        mut log_posteriors: Vec<Vec<f32>>,
        log_priors: &[f32],
    ) -> Result<Self, GopError> {
        if log_priors.len() != transitions.num_pdfs() {
            return Err(GopError::invalid_input(format!(
                "{} priors for {} pdfs",
                log_priors.len(),
                transitions.num_pdfs()
            )));
        }
        for row in &mut log_posteriors {
            for (v, prior) in row.iter_mut().zip(log_priors) {
                *v -= prior;
            }
        }
        Self::new(transitions, log_posteriors)
    }

    pub fn log_likes(&self) -> &[Vec<f32>] {
        &self.log_likes
    }
}

impl LikelihoodSource for DecodableMatrix {
    fn num_frames(&self) -> usize {
        self.log_likes.len()
    }

    /// Unknown state ids score as impossible.
    fn log_likelihood(&self, frame: usize, state: StateId) -> f32 {
        match self.transitions.transition_id_to_pdf(state) {
            Some(pdf) => self.log_likes[frame][pdf as usize],
            None => f32::NEG_INFINITY,
        }
    }
}
