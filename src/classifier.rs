// src/classifier.rs
//
// Maps raw execution records into the closed verdict taxonomy. The status
// table below is the single source of truth for translating the provider's
// opaque integer codes; nothing else in the engine may interpret them.

use crate::models::{RawExecutionResult, Verdict};
use crate::templates::codec;

// Provider status codes.
pub const STATUS_IN_QUEUE: i32 = 1;
pub const STATUS_PROCESSING: i32 = 2;
pub const STATUS_ACCEPTED: i32 = 3;
pub const STATUS_WRONG_ANSWER: i32 = 4;
pub const STATUS_TIME_LIMIT_EXCEEDED: i32 = 5;
pub const STATUS_COMPILATION_ERROR: i32 = 6;
pub const STATUS_RUNTIME_ERROR_SIGSEGV: i32 = 7;
pub const STATUS_RUNTIME_ERROR_NZEC: i32 = 11;
pub const STATUS_INTERNAL_ERROR: i32 = 13;

/// Translates a provider status code into a verdict. Runtime failures span
/// several provider codes (signals, non-zero exit, internal errors); anything
/// unrecognized is a runtime error as well, never a silent pass.
pub fn verdict_for_status(status: i32) -> Verdict {
    match status {
        STATUS_ACCEPTED => Verdict::Accepted,
        STATUS_WRONG_ANSWER => Verdict::WrongAnswer,
        STATUS_TIME_LIMIT_EXCEEDED => Verdict::TimeLimitExceeded,
        STATUS_COMPILATION_ERROR => Verdict::CompilationError,
        7..=12 => Verdict::RuntimeError,
        _ => Verdict::RuntimeError,
    }
}

/// Outcome of classifying one raw execution record against an expected
/// output.
#[derive(Debug, Clone)]
pub struct Classification {
    pub verdict: Verdict,
    pub actual_output: String,
    pub passed: bool,
}

/// Classifies one execution record. Output comparison happens only when the
/// provider itself reports accepted; a mismatch there downgrades to
/// `WrongAnswer`. Non-accepted provider statuses are never upgraded by
/// output comparison.
pub fn classify(raw: &RawExecutionResult, expected_output: &str) -> Classification {
    let stdout = raw.stdout.as_deref().unwrap_or("").trim().to_string();
    let expected = expected_output.trim();

    let actual_output = normalize_actual(&stdout, expected);
    let provider_verdict = verdict_for_status(raw.status);

    if provider_verdict != Verdict::Accepted {
        return Classification {
            verdict: provider_verdict,
            actual_output,
            passed: false,
        };
    }

    let passed = outputs_match(&stdout, expected);
    Classification {
        verdict: if passed { Verdict::Accepted } else { Verdict::WrongAnswer },
        actual_output,
        passed,
    }
}

/// When the expected output is a character-array literal, flat program
/// output is expanded back into array form before comparison. Kept symmetric
/// with the templater's input collapsing.
fn outputs_match(actual: &str, expected: &str) -> bool {
    match codec::as_char_array(expected) {
        Some(expected_chars) => codec::decode_char_array(actual) == expected_chars,
        None => actual == expected,
    }
}

/// Normalized actual output as reported in the test result: expanded to the
/// character-array representation whenever the expected output is itself an
/// array literal.
fn normalize_actual(actual: &str, expected: &str) -> String {
    if codec::as_char_array(expected).is_some() {
        serde_json::to_string(&codec::decode_char_array(actual))
            .unwrap_or_else(|_| actual.to_string())
    } else {
        actual.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: i32, stdout: &str) -> RawExecutionResult {
        RawExecutionResult {
            status,
            stdout: Some(stdout.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn status_table_covers_the_taxonomy() {
        assert_eq!(verdict_for_status(STATUS_ACCEPTED), Verdict::Accepted);
        assert_eq!(verdict_for_status(STATUS_WRONG_ANSWER), Verdict::WrongAnswer);
        assert_eq!(
            verdict_for_status(STATUS_TIME_LIMIT_EXCEEDED),
            Verdict::TimeLimitExceeded
        );
        assert_eq!(
            verdict_for_status(STATUS_COMPILATION_ERROR),
            Verdict::CompilationError
        );
        assert_eq!(
            verdict_for_status(STATUS_RUNTIME_ERROR_SIGSEGV),
            Verdict::RuntimeError
        );
        assert_eq!(
            verdict_for_status(STATUS_RUNTIME_ERROR_NZEC),
            Verdict::RuntimeError
        );
    }

    #[test]
    fn unrecognized_status_is_a_runtime_error() {
        assert_eq!(verdict_for_status(0), Verdict::RuntimeError);
        assert_eq!(verdict_for_status(99), Verdict::RuntimeError);
        assert_eq!(verdict_for_status(-1), Verdict::RuntimeError);
    }

    #[test]
    fn accepted_with_matching_output_passes() {
        let c = classify(&raw(STATUS_ACCEPTED, "  42\n"), "42");
        assert_eq!(c.verdict, Verdict::Accepted);
        assert!(c.passed);
        assert_eq!(c.actual_output, "42");
    }

    #[test]
    fn accepted_with_mismatched_output_downgrades_to_wrong_answer() {
        let c = classify(&raw(STATUS_ACCEPTED, "41"), "42");
        assert_eq!(c.verdict, Verdict::WrongAnswer);
        assert!(!c.passed);
    }

    #[test]
    fn non_accepted_status_is_never_upgraded_by_matching_output() {
        let c = classify(&raw(STATUS_RUNTIME_ERROR_NZEC, "42"), "42");
        assert_eq!(c.verdict, Verdict::RuntimeError);
        assert!(!c.passed);
    }

    #[test]
    fn whitespace_is_stripped_before_comparison() {
        let c = classify(&raw(STATUS_ACCEPTED, "\n hello \n"), "  hello  ");
        assert!(c.passed);
    }

    #[test]
    fn flat_output_is_expanded_when_expected_is_a_char_array() {
        let c = classify(&raw(STATUS_ACCEPTED, "olleh"), r#"["o","l","l","e","h"]"#);
        assert_eq!(c.verdict, Verdict::Accepted);
        assert!(c.passed);
        assert_eq!(c.actual_output, r#"["o","l","l","e","h"]"#);
    }

    #[test]
    fn empty_array_output_is_compared_exactly() {
        // `[]` is not a char array; it must match by plain string equality,
        // not be decoded character by character.
        let c = classify(&raw(STATUS_ACCEPTED, "[]"), "[]");
        assert_eq!(c.verdict, Verdict::Accepted);
        assert!(c.passed);
        assert_eq!(c.actual_output, "[]");
    }

    #[test]
    fn expanded_output_mismatch_is_wrong_answer() {
        let c = classify(&raw(STATUS_ACCEPTED, "hello"), r#"["o","l","l","e","h"]"#);
        assert_eq!(c.verdict, Verdict::WrongAnswer);
        assert!(!c.passed);
    }
}
