//! Brain adapters
//!
//! One adapter per provider, each implementing
//! [`BrainAdapter`](mirror_application::BrainAdapter) over `reqwest`.

mod anthropic;
mod factory;
mod gemini;
mod http;
mod mock;
mod openai;
mod sse;

pub use anthropic::AnthropicBrain;
pub use factory::{BrainFactory, FactoryError, MOCK_ENV_VARS, build_classifier, mock_brains_from_env};
pub use gemini::GeminiBrain;
pub use mock::MockBrain;
pub use openai::OpenAiBrain;
