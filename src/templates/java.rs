// src/templates/java.rs

use regex::Regex;

use crate::templates::{stdin_payload, LanguageTemplate, PreparedProgram};

/// Templating for Java submissions. The user supplies a `Solution` class;
/// the template synthesizes a `Main` entry point that reads one line of
/// stdin, converts it to the solution method's parameter type, invokes the
/// method and prints the result. Code that already carries its own `main`
/// passes through unmodified.
pub struct JavaTemplate;

/// Signature of the solution method as declared in the starter code.
struct SolutionSignature {
    method: String,
    param_type: String,
}

fn solution_signature(user_code: &str, starter_code: &str) -> SolutionSignature {
    // First method with a lowercase name, so the Solution constructor does
    // not match.
    let re = Regex::new(
        r"(?m)(?:public\s+|protected\s+|private\s+)?(?:static\s+)?[A-Za-z_][\w<>\[\]]*\s+([a-z]\w*)\s*\(\s*([A-Za-z_][\w<>\[\]]*)?",
    )
    .unwrap();
    re.captures(starter_code)
        .or_else(|| re.captures(user_code))
        .map(|caps| SolutionSignature {
            method: caps[1].to_string(),
            param_type: caps
                .get(2)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "String".to_string()),
        })
        .unwrap_or_else(|| SolutionSignature {
            method: "solve".to_string(),
            param_type: "String".to_string(),
        })
}

/// Expression converting the raw stdin line into the parameter type.
fn argument_expr(param_type: &str) -> &'static str {
    match param_type {
        "int" | "Integer" => "Integer.parseInt(line)",
        "long" | "Long" => "Long.parseLong(line)",
        "double" | "Double" => "Double.parseDouble(line)",
        "boolean" | "Boolean" => "Boolean.parseBoolean(line)",
        _ => "line",
    }
}

fn has_entry_point(user_code: &str) -> bool {
    user_code.contains("static void main")
}

impl LanguageTemplate for JavaTemplate {
    fn prepare(&self, user_code: &str, starter_code: &str, test_input: &str) -> PreparedProgram {
        let stdin = stdin_payload(test_input);

        // A full program must not be wrapped a second time.
        if has_entry_point(user_code) {
            return PreparedProgram {
                source: user_code.to_string(),
                stdin,
            };
        }

        let signature = solution_signature(user_code, starter_code);
        let argument = argument_expr(&signature.param_type);

        // The compilation unit may contain only one public class, so the
        // user's Solution is demoted to package visibility.
        let solution_class = user_code.replace("public class Solution", "class Solution");

        let source = format!(
            r#"import java.util.Scanner;

public class Main {{
    public static void main(String[] args) {{
        Scanner scanner = new Scanner(System.in);
        String line = scanner.hasNextLine() ? scanner.nextLine() : "";
        Solution solution = new Solution();
        System.out.println(solution.{method}({argument}));
    }}
}}

{solution_class}
"#,
            method = signature.method,
        );

        PreparedProgram { source, stdin }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTER: &str = "class Solution {\n    public String reverseWords(String s) {\n    }\n}\n";

    #[test]
    fn wraps_solution_class_with_entry_point() {
        let code = "class Solution {\n    public String reverseWords(String s) {\n        return s;\n    }\n}";
        let prepared = JavaTemplate.prepare(code, STARTER, "\"the sky\"");
        assert!(prepared.source.contains("public class Main"));
        assert!(prepared.source.contains("solution.reverseWords(line)"));
        assert!(prepared.source.contains("class Solution"));
    }

    #[test]
    fn full_program_passes_through_unmodified() {
        let code = "public class Main {\n    public static void main(String[] args) {\n        System.out.println(42);\n    }\n}";
        let prepared = JavaTemplate.prepare(code, STARTER, "1");
        assert_eq!(prepared.source, code);
    }

    #[test]
    fn numeric_parameter_gets_parsed() {
        let starter = "class Solution {\n    public int square(int n) {\n    }\n}\n";
        let prepared = JavaTemplate.prepare(
            "class Solution {\n    public int square(int n) {\n        return n * n;\n    }\n}",
            starter,
            "7",
        );
        assert!(prepared.source.contains("solution.square(Integer.parseInt(line))"));
    }

    #[test]
    fn public_solution_class_is_demoted() {
        let code = "public class Solution {\n    public String echo(String s) {\n        return s;\n    }\n}";
        let prepared = JavaTemplate.prepare(code, "", "\"x\"");
        assert!(!prepared.source.contains("public class Solution"));
        assert!(prepared.source.contains("class Solution"));
    }
}
