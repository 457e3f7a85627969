// src/templates/mod.rs

pub mod codec;
pub mod java;
pub mod python;

use java::JavaTemplate;
use python::PythonTemplate;

/// Concrete program text and stdin payload handed to the execution service
/// for one test case.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedProgram {
    pub source: String,
    pub stdin: String,
}

/// A common trait for per-language source templating.
/// One implementation per supported language; each takes the user's raw code
/// plus the problem's starter code and one test input, and returns the same
/// `(source, stdin)` contract. Templating never executes anything and cannot
/// fail at runtime; a malformed template is a construction-time defect.
pub trait LanguageTemplate: Send + Sync {
    fn prepare(&self, user_code: &str, starter_code: &str, test_input: &str) -> PreparedProgram;
}

static PYTHON: PythonTemplate = PythonTemplate;
static JAVA: JavaTemplate = JavaTemplate;

/// Looks up the template strategy for an internal language name.
/// Unknown names fall back to the Python template, mirroring the execution
/// client's fallback language.
pub fn template_for(language: &str) -> &'static dyn LanguageTemplate {
    match language {
        "python" | "python3" => &PYTHON,
        "java" => &JAVA,
        _ => &PYTHON,
    }
}

/// Builds the stdin payload for a test input: single-character arrays are
/// collapsed to their flat string form, everything else passes through
/// trimmed.
pub(crate) fn stdin_payload(test_input: &str) -> String {
    match codec::as_char_array(test_input) {
        Some(chars) => codec::encode_char_array(&chars),
        None => test_input.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_array_input_is_flattened() {
        assert_eq!(stdin_payload(r#"["a","b","c"]"#), "abc");
    }

    #[test]
    fn other_inputs_pass_through_trimmed() {
        assert_eq!(stdin_payload(" [1,2,3] "), "[1,2,3]");
        assert_eq!(stdin_payload("\"hello\""), "\"hello\"");
    }

    #[test]
    fn empty_array_input_keeps_its_literal_form() {
        assert_eq!(stdin_payload("[]"), "[]");
    }

    #[test]
    fn unknown_language_falls_back_to_python() {
        let prepared = template_for("cobol").prepare("def f(x):\n    return x", "", "1");
        assert!(prepared.source.contains("json"));
    }
}
