//! Prompt construction.
//!
//! The instruction block is fixed text: the model is told to answer with
//! JSON carrying exactly the four contract keys and nothing else. Keeping
//! this deterministic (no timestamps, no randomness) means identical input
//! always produces an identical request body.

use crate::config::Mode;

const BASE_INSTRUCTION: &str = "You are a deterministic engineering reasoning engine.\n\
    Respond ONLY in valid JSON with keys:\n\
    summary (string), observations (list), recommendations (list), confidence (0.0-1.0).\n\
    No extra text.\n";

const PLAN_INSTRUCTION: &str = "Provide actionable step-by-step recommendations.\n";

/// Render the exact text sent to inference: instruction block, optional
/// plan-mode line, separator, then the (already truncated) user input
/// verbatim.
pub fn build(user_input: &str, mode: Mode) -> String {
    let mut prompt = String::with_capacity(
        BASE_INSTRUCTION.len() + PLAN_INSTRUCTION.len() + user_input.len() + 16,
    );
    prompt.push_str(BASE_INSTRUCTION);
    if mode == Mode::Plan {
        prompt.push_str(PLAN_INSTRUCTION);
    }
    prompt.push_str("\nInput:\n");
    prompt.push_str(user_input);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advise_mode_omits_plan_instruction() {
        let prompt = build("disk is filling up", Mode::Advise);
        assert!(prompt.contains("deterministic engineering reasoning engine"));
        assert!(!prompt.contains("step-by-step"));
        assert!(prompt.ends_with("\nInput:\ndisk is filling up"));
    }

    #[test]
    fn plan_mode_adds_step_by_step_line() {
        let prompt = build("migrate the database", Mode::Plan);
        assert!(prompt.contains("Provide actionable step-by-step recommendations.\n"));
    }

    #[test]
    fn input_is_appended_verbatim() {
        let input = "line one\n  indented {json: \"stuff\"}  \n";
        let prompt = build(input, Mode::Advise);
        assert!(prompt.ends_with(input));
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        assert_eq!(build("same", Mode::Plan), build("same", Mode::Plan));
    }

    #[test]
    fn contract_keys_are_spelled_out() {
        let prompt = build("x", Mode::Advise);
        for key in ["summary", "observations", "recommendations", "confidence"] {
            assert!(prompt.contains(key), "instruction must name {key}");
        }
    }
}
