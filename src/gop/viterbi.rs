use std::collections::HashMap;

use crate::config::GopConfig;
use crate::error::GopError;
use crate::gop::graph::{GraphStateId, PronunciationGraph};
use crate::pipeline::traits::{LikelihoodSource, SearchOutcome};
use crate::types::StateId;

/// Back-pointer arena entry: the label emitted at one frame and the entry before it.
#[derive(Debug, Clone, Copy)]
struct Trace {
    label: StateId,
    prev: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    cost: f32,
    trace: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    state: GraphStateId,
    cost: f32,
    label: StateId,
    prev: Option<usize>,
}

/// Frame-synchronous beam Viterbi over `graph`.
///
/// Costs are negated log-likelihoods. After every frame, hypotheses worse than the best
/// by more than `beam` are dropped and at most `max_active` survive. A beam that is not
/// strictly positive is replaced by [`GopConfig::DEFAULT_BEAM`]. If no final state is
/// active after the last frame, the best partial path is returned with
/// `reached_final == false`. Fails only when every hypothesis dies before the end.
pub fn beam_viterbi(
    graph: &PronunciationGraph,
    source: &dyn LikelihoodSource,
    beam: f32,
    max_active: usize,
) -> Result<SearchOutcome, GopError> {
    let start = graph
        .start()
        .ok_or_else(|| GopError::alignment("graph has no start state"))?;
    let num_frames = source.num_frames();
    let beam = if beam > 0.0 {
        beam
    } else {
        tracing::warn!(beam, "invalid search beam, using the default");
        GopConfig::DEFAULT_BEAM
    };

    let mut arena: Vec<Trace> = Vec::with_capacity(num_frames);
    let mut active: Vec<(GraphStateId, Token)> = vec![(
        start,
        Token {
            cost: 0.0,
            trace: None,
        },
    )];

    for frame in 0..num_frames {
        let mut next: Vec<Candidate> = Vec::with_capacity(active.len() * 2);
        let mut slot: HashMap<GraphStateId, usize> = HashMap::with_capacity(active.len() * 2);

        for &(state, token) in &active {
            for arc in graph.arcs(state) {
                let cost = token.cost + arc.cost - source.log_likelihood(frame, arc.label);
                if !cost.is_finite() {
                    continue;
                }
                let candidate = Candidate {
                    state: arc.next,
                    cost,
                    label: arc.label,
                    prev: token.trace,
                };
                match slot.get(&arc.next) {
                    Some(&i) if next[i].cost <= cost => {}
                    Some(&i) => next[i] = candidate,
                    None => {
                        slot.insert(arc.next, next.len());
                        next.push(candidate);
                    }
                }
            }
        }

        if next.is_empty() {
            return Err(GopError::alignment(format!(
                "no surviving hypothesis at frame {frame} of {num_frames}"
            )));
        }
        prune(&mut next, beam, max_active);

        active = next
            .into_iter()
            .map(|c| {
                arena.push(Trace {
                    label: c.label,
                    prev: c.prev,
                });
                (
                    c.state,
                    Token {
                        cost: c.cost,
                        trace: Some(arena.len() - 1),
                    },
                )
            })
            .collect();
    }

    let best_final = active
        .iter()
        .filter_map(|&(state, token)| graph.final_cost(state).map(|fc| (token.cost + fc, token)))
        .min_by(|a, b| a.0.total_cmp(&b.0));

    let (cost, token, reached_final) = match best_final {
        Some((cost, token)) => (cost, token, true),
        None => {
            let (_, token) = active
                .iter()
                .copied()
                .min_by(|a, b| a.1.cost.total_cmp(&b.1.cost))
                .ok_or_else(|| GopError::alignment("search ended with no hypotheses"))?;
            tracing::warn!(
                num_frames,
                num_active = active.len(),
                "forced alignment did not reach a final state; using best partial path"
            );
            (token.cost, token, false)
        }
    };

    Ok(SearchOutcome {
        alignment: traceback(&arena, token.trace),
        score: -cost,
        reached_final,
    })
}

fn prune(candidates: &mut Vec<Candidate>, beam: f32, max_active: usize) {
    let best = candidates
        .iter()
        .map(|c| c.cost)
        .fold(f32::INFINITY, f32::min);
    candidates.retain(|c| c.cost <= best + beam);
    if candidates.len() > max_active.max(1) {
        candidates.sort_by(|a, b| a.cost.total_cmp(&b.cost));
        candidates.truncate(max_active.max(1));
    }
}

fn traceback(arena: &[Trace], mut cursor: Option<usize>) -> Vec<StateId> {
    let mut path = Vec::new();
    while let Some(i) = cursor {
        path.push(arena[i].label);
        cursor = arena[i].prev;
    }
    path.reverse();
    path
}
