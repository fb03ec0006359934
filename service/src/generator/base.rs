//! Base functionality shared by the Python code generators

use super::traits::{CodeFormatter, GeneratorResult};
use serde_json::Value;

/// Reserved words that cannot name a Python attribute
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import", "in",
    "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

/// Base code formatter with common functionality
pub struct BaseCodeFormatter;

impl BaseCodeFormatter {
    /// Escape a string for a double-quoted Python literal
    #[must_use]
    pub fn escape_python_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    /// Escape only double quotes, for text placed inside triple-quoted
    /// docstrings and descriptions
    #[must_use]
    pub fn escape_description(s: &str) -> String {
        s.replace('"', "\\\"")
    }

    /// Quote a string as a double-quoted Python literal
    #[must_use]
    pub fn python_string(s: &str) -> String {
        format!("\"{}\"", Self::escape_python_string(s))
    }

    /// Render a JSON value as a Python literal
    ///
    /// Objects become dicts with single-quoted keys, `null` becomes `None`
    /// and booleans are capitalized.
    #[must_use]
    pub fn python_literal(value: &Value) -> String {
        match value {
            Value::Null => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => format!(
                "'{}'",
                s.replace('\\', "\\\\")
                    .replace('\'', "\\'")
                    .replace('\n', "\\n")
                    .replace('\r', "\\r")
            ),
            Value::Array(items) => {
                let inner: Vec<String> = items.iter().map(Self::python_literal).collect();
                format!("[{}]", inner.join(", "))
            }
            Value::Object(map) => {
                let inner: Vec<String> = map
                    .iter()
                    .map(|(k, v)| {
                        format!(
                            "{}: {}",
                            Self::python_literal(&Value::String(k.clone())),
                            Self::python_literal(v)
                        )
                    })
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
        }
    }

    /// Remove the common leading whitespace from every non-blank line
    #[must_use]
    pub fn dedent(text: &str) -> String {
        let margin = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
            .min()
            .unwrap_or(0);

        text.lines()
            .map(|line| {
                if line.trim().is_empty() {
                    ""
                } else {
                    // margin counts chars, not bytes
                    line.char_indices().nth(margin).map_or("", |(at, _)| &line[at..])
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Prefix every non-blank line with `prefix`
    #[must_use]
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| {
                if line.trim().is_empty() {
                    String::new()
                } else {
                    format!("{prefix}{line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Turn an enum permissible value into a Python identifier
    #[must_use]
    pub fn enum_label(text: &str) -> String {
        let mut label: String = text
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if label.is_empty() {
            label.push('_');
        }
        if label.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            label.insert_str(0, "number_");
        }
        if PYTHON_KEYWORDS.contains(&label.as_str()) {
            label.push('_');
        }
        label
    }
}

/// Source normalizer for generated Python
///
/// Strips trailing whitespace, keeps exactly two blank lines before
/// top-level definitions, collapses other runs of blank lines to one and
/// ends the file with a single newline.
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonFormatter;

impl CodeFormatter for PythonFormatter {
    fn name(&self) -> &'static str {
        "python"
    }

    fn format_code(&self, code: &str) -> GeneratorResult<String> {
        let mut out: Vec<String> = Vec::new();
        let mut pending_blank = 0usize;

        for raw in code.lines() {
            let line = raw.trim_end();
            if line.is_empty() {
                pending_blank += 1;
                continue;
            }

            if !out.is_empty() {
                let top_level_def = line.starts_with("class ")
                    || line.starts_with("def ")
                    || line.starts_with('@');
                let decorated = out.last().is_some_and(|prev| prev.starts_with('@'));
                let blanks = if top_level_def && !decorated {
                    2
                } else {
                    pending_blank.min(1)
                };
                out.extend(std::iter::repeat_n(String::new(), blanks));
            }
            pending_blank = 0;
            out.push(line.to_string());
        }

        let mut formatted = out.join("\n");
        formatted.push('\n');
        Ok(formatted)
    }

    fn escape_string(&self, s: &str) -> String {
        BaseCodeFormatter::escape_python_string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_string_escaping() {
        let test_str = "Hello \"world\"\nNew line\t\ttab";
        let escaped_py = BaseCodeFormatter::escape_python_string(test_str);
        assert_eq!(escaped_py, "Hello \\\"world\\\"\\nNew line\\t\\ttab");
        assert_eq!(BaseCodeFormatter::escape_description("a \"b\""), "a \\\"b\\\"");
    }

    #[test]
    fn test_python_literal() {
        let value = json!({"from_schema": "https://x.org/s", "tree_root": true, "n": 3, "none": null, "l": ["a'b"]});
        assert_eq!(
            BaseCodeFormatter::python_literal(&value),
            "{'from_schema': 'https://x.org/s', 'tree_root': True, 'n': 3, 'none': None, 'l': ['a\\'b']}"
        );
    }

    #[test]
    fn test_dedent_and_indent() {
        let text = "    class A:\n        pass\n";
        assert_eq!(BaseCodeFormatter::dedent(text), "class A:\n    pass");
        assert_eq!(BaseCodeFormatter::indent("a\n\nb", "  "), "  a\n\n  b");
    }

    #[test]
    fn test_enum_label() {
        assert_eq!(BaseCodeFormatter::enum_label("red"), "red");
        assert_eq!(BaseCodeFormatter::enum_label("dark blue"), "dark_blue");
        assert_eq!(BaseCodeFormatter::enum_label("1st"), "number_1st");
        assert_eq!(BaseCodeFormatter::enum_label("None"), "None_");
        assert_eq!(BaseCodeFormatter::enum_label("class"), "class_");
        assert_eq!(BaseCodeFormatter::enum_label("classic"), "classic");
    }

    #[test]
    fn test_dedent_non_ascii_indent() {
        let text = "\u{a0}\u{a0}class A:\n\u{a0}\u{a0}    pass";
        assert_eq!(BaseCodeFormatter::dedent(text), "class A:\n    pass");
        assert_eq!(BaseCodeFormatter::dedent("\u{a0}x\n y"), "x\ny");
        assert_eq!(BaseCodeFormatter::dedent("\u{a0}x\n  y"), "x\n y");
    }

    #[test]
    fn test_python_literal_carriage_return() {
        assert_eq!(BaseCodeFormatter::python_literal(&json!("a\r\nb")), "'a\\r\\nb'");
    }

    #[test]
    fn test_python_formatter_spacing() -> GeneratorResult<()> {
        let code = "import re\nclass A(B):   \n    x: int\n\n\n\n    y: int\nclass C(A):\n    pass";
        let formatted = PythonFormatter.format_code(code)?;
        assert_eq!(
            formatted,
            "import re\n\n\nclass A(B):\n    x: int\n\n    y: int\n\n\nclass C(A):\n    pass\n"
        );
        Ok(())
    }
}
