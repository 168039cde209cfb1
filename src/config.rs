use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::GopError;

#[derive(Debug, Clone)]
pub struct GopConfig {
    /// Transition model JSON (phone inventory, topology, transition table).
    pub model_path: String,
    /// Context-dependency tree JSON.
    pub tree_path: String,
    /// Beam width for forced alignment, in negated log-likelihood units.
    pub beam: f32,
    pub max_active: usize,
    pub transition_scale: f32,
}

impl GopConfig {
    /// Wide enough that forced alignment against a linear graph practically always succeeds.
    pub const DEFAULT_BEAM: f32 = 200.0;
    pub const DEFAULT_TRANSITION_SCALE: f32 = 1.0;
}

impl Default for GopConfig {
    fn default() -> Self {
        Self {
            model_path: String::new(),
            tree_path: String::new(),
            beam: Self::DEFAULT_BEAM,
            max_active: usize::MAX,
            transition_scale: Self::DEFAULT_TRANSITION_SCALE,
        }
    }
}

pub(crate) fn load_json<T: DeserializeOwned>(
    path: &Path,
    read_context: &'static str,
    parse_context: &'static str,
) -> Result<T, GopError> {
    let data = std::fs::read_to_string(path).map_err(|e| GopError::io(read_context, e))?;
    serde_json::from_str(&data).map_err(|e| GopError::json(parse_context, e))
}
