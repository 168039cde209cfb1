use std::path::Path;
use std::sync::Arc;

use crate::config::GopConfig;
use crate::error::GopError;
use crate::model::{GopModel, TableContextTree, TransitionModel};
use crate::pipeline::defaults::{BeamViterbiSearch, HmmGraphCompiler};
use crate::pipeline::runtime::{GopScorer, GopScorerParts};
use crate::pipeline::traits::{BestPathSearch, ContextTree, GraphCompiler};

pub struct GopScorerBuilder {
    config: GopConfig,
    context_tree: Option<Arc<dyn ContextTree>>,
    transition_model: Option<Arc<TransitionModel>>,
    graph_compiler: Option<Box<dyn GraphCompiler>>,
    best_path: Option<Box<dyn BestPathSearch>>,
}

impl GopScorerBuilder {
    pub fn new(config: GopConfig) -> Self {
        Self {
            config,
            context_tree: None,
            transition_model: None,
            graph_compiler: None,
            best_path: None,
        }
    }

    pub fn with_context_tree(mut self, context_tree: Arc<dyn ContextTree>) -> Self {
        self.context_tree = Some(context_tree);
        self
    }

    pub fn with_transition_model(mut self, transition_model: Arc<TransitionModel>) -> Self {
        self.transition_model = Some(transition_model);
        self
    }

    pub fn with_graph_compiler(mut self, graph_compiler: Box<dyn GraphCompiler>) -> Self {
        self.graph_compiler = Some(graph_compiler);
        self
    }

    pub fn with_best_path_search(mut self, best_path: Box<dyn BestPathSearch>) -> Self {
        self.best_path = Some(best_path);
        self
    }

    pub fn build(self) -> Result<GopScorer, GopError> {
        let transition_model = match self.transition_model {
            Some(tm) => tm,
            None => Arc::new(TransitionModel::load(Path::new(&self.config.model_path))?),
        };
        let context_tree: Arc<dyn ContextTree> = match self.context_tree {
            Some(tree) => tree,
            None => Arc::new(TableContextTree::load(Path::new(&self.config.tree_path))?),
        };
        let model = GopModel::new(context_tree, transition_model)?;

        let beam = if self.config.beam > 0.0 {
            self.config.beam
        } else {
            GopConfig::DEFAULT_BEAM
        };
        tracing::debug!(
            num_phones = model.phones().len(),
            num_pdfs = model.transitions().num_pdfs(),
            beam,
            max_active = self.config.max_active,
            "gop scorer: model ready"
        );

        Ok(GopScorer::from_parts(GopScorerParts {
            model: Arc::new(model),
            graph_compiler: self.graph_compiler.unwrap_or_else(|| {
                Box::new(HmmGraphCompiler {
                    transition_scale: self.config.transition_scale,
                })
            }),
            best_path: self.best_path.unwrap_or_else(|| {
                Box::new(BeamViterbiSearch {
                    beam,
                    max_active: self.config.max_active,
                })
            }),
        }))
    }
}
