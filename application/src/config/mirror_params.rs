//! Mirror run parameters.

use super::retry_policy::RetryPolicy;
use mirror_domain::{Intensity, MirrorPromptTemplate, Persona};

/// Static parameters of a [`RunMirrorUseCase`](crate::use_cases::run_mirror::RunMirrorUseCase).
#[derive(Debug, Clone, Default)]
pub struct MirrorParams {
    /// How hard the challenger pushes back
    pub intensity: Intensity,
    /// Optional persona lens for the challenger
    pub persona: Option<Persona>,
    /// Run the intent classifier before deciding single vs. dual
    pub auto_classify: bool,
    /// Retry policy applied to original, challenger and judge calls
    pub retry: RetryPolicy,
}

impl MirrorParams {
    pub fn with_intensity(mut self, intensity: Intensity) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_persona(mut self, persona: Option<Persona>) -> Self {
        self.persona = persona;
        self
    }

    pub fn with_auto_classify(mut self, enabled: bool) -> Self {
        self.auto_classify = enabled;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// System prompt for the challenger under these parameters
    pub fn challenger_prompt(&self) -> String {
        match self.persona {
            Some(persona) => MirrorPromptTemplate::persona_challenger_system(persona, self.intensity),
            None => MirrorPromptTemplate::challenger_system(self.intensity),
        }
    }
}
