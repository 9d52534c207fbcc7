use std::sync::Arc;

use crate::services::{providers::Providers, recommendations::Recommender};

/// Shared application state.
///
/// Only the model-backed recommender is shared; requests carry everything else.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
}

impl AppState {
    pub fn new(providers: Providers) -> Self {
        Self {
            recommender: Arc::new(Recommender::new(providers)),
        }
    }

    /// State backed by the local embedder and classifier
    pub fn local() -> Self {
        Self::new(Providers::local())
    }
}
