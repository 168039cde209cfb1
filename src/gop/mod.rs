pub mod context;
pub mod graph;
pub mod likelihood;
pub mod reconcile;
pub mod segments;
pub mod viterbi;
