use crate::error::GopError;
use crate::model::GopModel;
use crate::types::{PhoneContext, PhoneId, StateId, BOUNDARY_PHONE};

pub type GraphStateId = usize;

/// Emitting arc: consumes one frame, scored by the likelihood of `label`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphArc {
    pub label: StateId,
    /// Negated log-probability of taking the arc.
    pub cost: f32,
    pub next: GraphStateId,
}

#[derive(Debug, Clone, Default)]
struct GraphState {
    arcs: Vec<GraphArc>,
    final_cost: Option<f32>,
}

/// Weighted automaton searched by the forced aligner. Every arc emits; there are no
/// epsilon arcs.
#[derive(Debug, Clone, Default)]
pub struct PronunciationGraph {
    states: Vec<GraphState>,
    start: Option<GraphStateId>,
}

impl PronunciationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state(&mut self) -> GraphStateId {
        self.states.push(GraphState::default());
        self.states.len() - 1
    }

    pub fn set_start(&mut self, state: GraphStateId) {
        self.start = Some(state);
    }

    pub fn start(&self) -> Option<GraphStateId> {
        self.start
    }

    pub fn add_arc(&mut self, from: GraphStateId, arc: GraphArc) {
        self.states[from].arcs.push(arc);
    }

    pub fn set_final(&mut self, state: GraphStateId, cost: f32) {
        self.states[state].final_cost = Some(cost);
    }

    pub fn final_cost(&self, state: GraphStateId) -> Option<f32> {
        self.states.get(state).and_then(|s| s.final_cost)
    }

    pub fn arcs(&self, state: GraphStateId) -> &[GraphArc] {
        self.states.get(state).map_or(&[], |s| s.arcs.as_slice())
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }
}

/// Left-to-right HMM chain for a phone transcript.
///
/// Each phone contributes one graph state per pdf class with a self-loop and a forward
/// arc; the state after the last phone is final. Pdfs are context dependent, with the
/// boundary phone outside the transcript.
pub fn compile_linear_hmm(
    model: &GopModel,
    transcript: &[PhoneId],
    transition_scale: f32,
) -> Result<PronunciationGraph, GopError> {
    if transcript.is_empty() {
        return Err(GopError::invalid_input("transcript has no phones"));
    }
    let transitions = model.transitions();
    let resolver = model.resolver();

    let mut graph = PronunciationGraph::new();
    let mut entry = graph.add_state();
    graph.set_start(entry);

    for (i, &phone) in transcript.iter().enumerate() {
        let left = if i == 0 { BOUNDARY_PHONE } else { transcript[i - 1] };
        let right = transcript.get(i + 1).copied().unwrap_or(BOUNDARY_PHONE);
        let context = PhoneContext::new(left, phone, right);
        let num_classes = transitions.num_pdf_classes(phone).ok_or_else(|| {
            GopError::invalid_input(format!("transcript phone {phone} is not in the topology"))
        })?;

        let hmm_states: Vec<GraphStateId> = (0..num_classes)
            .map(|c| if c == 0 { entry } else { graph.add_state() })
            .collect();
        let exit = graph.add_state();

        for (pdf_class, &state) in hmm_states.iter().enumerate() {
            let pdf = resolver.resolve_pdf(&context, pdf_class)?;
            let next = hmm_states.get(pdf_class + 1).copied().unwrap_or(exit);

            if let Some(tid) = transitions.transition_id(phone, pdf_class, pdf, true) {
                graph.add_arc(state, arc(transitions, tid, state, transition_scale));
            }
            let tid = transitions
                .transition_id(phone, pdf_class, pdf, false)
                .ok_or_else(|| {
                    GopError::state_resolution(
                        context.window(),
                        pdf_class,
                        format!("no forward transition for pdf {pdf}"),
                    )
                })?;
            graph.add_arc(state, arc(transitions, tid, next, transition_scale));
        }
        entry = exit;
    }

    graph.set_final(entry, 0.0);
    Ok(graph)
}

fn arc(
    transitions: &crate::model::TransitionModel,
    tid: StateId,
    next: GraphStateId,
    transition_scale: f32,
) -> GraphArc {
    let log_prob = transitions.entry(tid).map_or(0.0, |t| t.log_prob);
    GraphArc {
        label: tid,
        cost: -transition_scale * log_prob,
        next,
    }
}
