// src/templates/python.rs

use regex::Regex;

use crate::templates::{stdin_payload, LanguageTemplate, PreparedProgram};

/// Templating for Python submissions. The user supplies a bare function
/// definition; the harness reads one line of stdin, parses it as JSON where
/// possible, calls the solution function and prints the result on one line.
pub struct PythonTemplate;

/// Extracts the solution function name, preferring the starter code's
/// definition so renamed user helpers do not confuse the harness.
fn solution_function(user_code: &str, starter_code: &str) -> String {
    let re = Regex::new(r"def\s+([A-Za-z_]\w*)\s*\(").unwrap();
    re.captures(starter_code)
        .or_else(|| re.captures(user_code))
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| "solution".to_string())
}

impl LanguageTemplate for PythonTemplate {
    fn prepare(&self, user_code: &str, starter_code: &str, test_input: &str) -> PreparedProgram {
        let function = solution_function(user_code, starter_code);

        let source = format!(
            r#"{user_code}

import json
import sys

if __name__ == "__main__":
    _line = sys.stdin.readline().rstrip("\n")
    try:
        _arg = json.loads(_line)
    except ValueError:
        _arg = _line
    _result = {function}(_arg)
    if isinstance(_result, str):
        print(_result)
    elif isinstance(_result, list) and all(
        isinstance(_c, str) and len(_c) == 1 for _c in _result
    ):
        print("".join(_result))
    else:
        print(json.dumps(_result))
"#
        );

        PreparedProgram {
            source,
            stdin: stdin_payload(test_input),
        }
    }
}
