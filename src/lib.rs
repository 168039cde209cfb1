pub mod config;
pub mod error;
pub mod gop;
pub mod model;
pub mod pipeline;
pub mod types;

pub use config::GopConfig;
pub use error::GopError;
pub use gop::likelihood::{log_sum_exp_pruned, SegmentLikelihoodEngine, SegmentScore};
pub use gop::reconcile::{reconcile_frame_counts, FrameAdjustment};
pub use model::{DecodableMatrix, GopModel, TableContextTree, TransitionModel};
pub use pipeline::builder::GopScorerBuilder;
pub use pipeline::runtime::GopScorer;
pub use pipeline::traits::{BestPathSearch, ContextTree, GraphCompiler, LikelihoodSource};
pub use types::{
    AlignedGopOutput, GopInput, GopOutput, PhoneContext, PhoneId, Segment, StateId,
    BOUNDARY_PHONE,
};
