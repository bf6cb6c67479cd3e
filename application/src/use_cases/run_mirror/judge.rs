//! Judge pass: reconcile the two answers

use super::retry::RetryingStream;
use crate::config::RetryPolicy;
use crate::ports::brain::{BrainAdapter, ChatOptions};
use mirror_domain::{
    CompletedResponse, MirrorPromptTemplate, SynthesisResult, extract_agreement_score,
};
use std::sync::Arc;

pub struct JudgePass {
    brain: Arc<dyn BrainAdapter>,
}

impl JudgePass {
    pub fn new(brain: Arc<dyn BrainAdapter>) -> Self {
        Self { brain }
    }

    pub fn brain_id(&self) -> &str {
        self.brain.id()
    }

    /// Start the judge call over both completed answers
    pub fn stream(
        &self,
        question: &str,
        original: &CompletedResponse,
        challenger: &CompletedResponse,
        options: &ChatOptions,
        policy: RetryPolicy,
    ) -> RetryingStream {
        RetryingStream::new(
            Arc::clone(&self.brain),
            MirrorPromptTemplate::judge_messages(question, &original.text, &challenger.text),
            MirrorPromptTemplate::judge_system(),
            options.clone(),
            policy,
        )
    }

    /// Turn the judge's raw response into a scored synthesis
    pub fn finish(response: CompletedResponse) -> SynthesisResult {
        SynthesisResult {
            agreement_score: extract_agreement_score(&response.text),
            text: response.text,
            input_tokens: response.input_tokens,
            output_tokens: response.output_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::run_mirror::fakes::ScriptedBrain;
    use mirror_domain::Role;

    #[test]
    fn test_finish_extracts_score() {
        let result = JudgePass::finish(CompletedResponse {
            text: "AGREEMENT: 40%\nThey diverge.\n\nSYNTHESIS\nDo X.".into(),
            input_tokens: Some(100),
            output_tokens: Some(20),
        });
        assert_eq!(result.agreement_score, Some(40));
        assert_eq!(result.output_tokens, Some(20));
    }

    #[test]
    fn test_finish_without_header() {
        let result = JudgePass::finish(CompletedResponse::from_text("Both are fine."));
        assert_eq!(result.agreement_score, None);
        assert_eq!(result.text, "Both are fine.");
    }

    #[tokio::test]
    async fn test_judge_sees_labelled_answers() {
        let brain = Arc::new(ScriptedBrain::answering("judge", "AGREEMENT: 80%"));
        let judge = JudgePass::new(brain.clone());
        let mut stream = judge.stream(
            "Which?",
            &CompletedResponse::from_text("Use A."),
            &CompletedResponse::from_text("Use B."),
            &ChatOptions::default(),
            RetryPolicy::none(),
        );
        while stream.next().await.is_some() {}

        let messages = brain.last_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert!(messages[0].content.contains("RESPONSE A (Original)\nUse A."));
        assert!(messages[0].content.contains("RESPONSE B (Challenger)\nUse B."));
        assert_eq!(brain.last_system(), MirrorPromptTemplate::judge_system());
    }
}
