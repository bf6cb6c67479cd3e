//! Mirror domain
//!
//! How hard the challenger pushes back ([`Intensity`]), through which lens
//! ([`Persona`]), and what the optional judge pass produces
//! ([`SynthesisResult`]).

pub mod intensity;
pub mod persona;
pub mod synthesis;

pub use intensity::Intensity;
pub use persona::Persona;
pub use synthesis::{SynthesisResult, extract_agreement_score};
