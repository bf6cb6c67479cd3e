//! Prompt templates for the mirror flow

use crate::conversation::ConversationMessage;
use crate::mirror::{Intensity, Persona};

/// Prefix the challenger sees on every earlier assistant turn
pub const PREVIOUS_ORIGINAL_MARKER: &str = "[PREVIOUS ORIGINAL RESPONSE]";

const BASE_RULE: &str = "Every point must have a specific mechanism. Vague doubt is useless.";

/// Templates for generating prompts at each stage
pub struct MirrorPromptTemplate;

impl MirrorPromptTemplate {
    /// System prompt for the original (primary) brain
    pub fn original_system() -> &'static str {
        "You are the primary assistant. Provide the best direct answer."
    }

    /// System prompt for the challenger at a given intensity
    pub fn challenger_system(intensity: Intensity) -> String {
        let structure = Self::challenger_structure(intensity);
        format!("{structure}\n{BASE_RULE}")
    }

    /// System prompt for a persona-driven challenger.
    ///
    /// The persona lens comes first, then the same structure the plain
    /// challenger uses at this intensity.
    pub fn persona_challenger_system(persona: Persona, intensity: Intensity) -> String {
        format!(
            "{}\n\n{}\n{BASE_RULE}",
            persona.lens(),
            Self::challenger_structure(intensity)
        )
    }

    fn challenger_structure(intensity: Intensity) -> &'static str {
        match intensity {
            Intensity::Mild => {
                "You are a gentle critic. Provide a full answer, then 1-2 real gaps and a steelman alternative."
            }
            Intensity::Moderate => {
                r#"You are a devil's advocate.
1. REFRAME the implicit assumption.
2. CHALLENGE THE FRAME with the question the user should have asked.
3. SURFACE HIDDEN COSTS that are under-weighted.
4. STRONGEST COUNTERPOSITION (no straw man).
5. VERDICT with honest synthesis."#
            }
            Intensity::Aggressive => {
                r#"You are adversarial.
1. BURIED ASSUMPTION: the most consequential unstated assumption.
2. STRONGEST REFUTATION against the dominant view.
3. FAILURE CASES: 2-3 concrete scenarios where standard advice fails.
4. EXPERT DISSENT: represent serious dissenting thinkers.
5. HONEST SYNTHESIS with calibrated confidence."#
            }
        }
    }

    /// History as the challenger sees it: earlier assistant turns are marked as
    /// the original brain's answers. The input slice is left untouched.
    pub fn challenger_history(history: &[ConversationMessage]) -> Vec<ConversationMessage> {
        history
            .iter()
            .map(|message| {
                if message.is_assistant() {
                    ConversationMessage::assistant(format!(
                        "{PREVIOUS_ORIGINAL_MARKER}\n{}",
                        message.content
                    ))
                } else {
                    message.clone()
                }
            })
            .collect()
    }

    /// System prompt for the synthesis judge
    pub fn judge_system() -> &'static str {
        r#"You are a neutral synthesis judge evaluating two AI responses to the same question.

Your output MUST follow this exact structure:

AGREEMENT: <number>%
<One sentence explaining what drives the score: where they converge or diverge>

SYNTHESIS
<The actual synthesized recommendation, the verdict after weighing both responses. Be concrete and actionable.>

BLIND SPOT
<What both models missed or assumed without questioning. Be specific: name the assumption or gap.>

Scoring guide for AGREEMENT:
- 90-100%: Substantively identical conclusions, only stylistic differences
- 70-89%: Same core answer, meaningful differences in emphasis or caveats
- 50-69%: Partial overlap, notable disagreement on key points
- 30-49%: Different conclusions but some shared premises
- 0-29%: Fundamentally opposed positions

Be direct and critical. Do not praise either response."#
    }

    /// The single user message handed to the judge
    pub fn judge_messages(
        question: &str,
        original_text: &str,
        challenger_text: &str,
    ) -> Vec<ConversationMessage> {
        vec![ConversationMessage::user(format!(
            r#"QUESTION
{question}

---

RESPONSE A (Original)
{original_text}

---

RESPONSE B (Challenger)
{challenger_text}

---

Provide your synthesis following the required format exactly."#
        ))]
    }

    /// System prompt for the LLM-backed intent classifier
    pub fn classifier_system() -> &'static str {
        r#"You are an intent classifier for a CLI assistant.
Return strict JSON with keys: category, shouldMirror, confidence, reason.
Categories: factual_lookup, math_computation, code_task, conversational, opinion_advice, analysis, interpretation, prediction.
Rules:
- factual_lookup, math_computation, code_task, conversational => shouldMirror false
- opinion_advice, analysis, interpretation, prediction => shouldMirror true
Confidence is 0-1.
Return ONLY JSON."#
    }
}
