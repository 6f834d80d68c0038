//! Remote generation services.

mod provider;
mod runware;
mod types;

pub use provider::{GenerationService, GenerationServiceExt};
pub use runware::{RunwareProvider, RunwareProviderBuilder, DEFAULT_ENDPOINT};
pub use types::{
    FallbackTemplate, GenerationResult, DEFAULT_FALLBACK_TEMPLATE, TASK_ID_PLACEHOLDER,
};
