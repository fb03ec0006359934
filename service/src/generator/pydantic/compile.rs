//! Structural check of generated Python source
//!
//! Catches the failures a broken template or a bad injected block would
//! cause: unbalanced brackets, unterminated strings, blocks without a body
//! and inconsistent indentation. It is not a Python parser.

use crate::generator::traits::{GeneratorError, GeneratorResult};

#[derive(Debug)]
struct LogicalLine {
    number: usize,
    indent: usize,
    opens_block: bool,
}

#[derive(Debug, Clone, Copy)]
struct OpenString {
    quote: char,
    triple: bool,
    line: usize,
}

fn fail(message: impl Into<String>, line: usize) -> GeneratorError {
    GeneratorError::Compilation {
        message: message.into(),
        line: Some(line),
    }
}

fn closing(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Split `source` into logical lines, tracking brackets and strings
fn logical_lines(source: &str) -> GeneratorResult<Vec<LogicalLine>> {
    let mut lines = Vec::new();
    let mut brackets: Vec<(char, usize)> = Vec::new();
    let mut string: Option<OpenString> = None;
    let mut current: Option<LogicalLine> = None;
    let mut continuation = false;

    for (index, text) in source.lines().enumerate() {
        let number = index + 1;
        let starts_logical = brackets.is_empty() && string.is_none() && !continuation;
        let trimmed = text.trim_start();

        if starts_logical {
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let leading = &text[..text.len() - trimmed.len()];
            if leading.contains('\t') {
                return Err(fail("tab in indentation", number));
            }
            current = Some(LogicalLine {
                number,
                indent: leading.len(),
                opens_block: false,
            });
        }
        continuation = false;

        let chars: Vec<char> = text.chars().collect();
        let mut last_code: Option<char> = None;
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];

            if let Some(open) = string {
                if c == '\\' {
                    i += 2;
                    continue;
                }
                if c == open.quote {
                    if !open.triple {
                        string = None;
                    } else if chars.get(i + 1) == Some(&open.quote) && chars.get(i + 2) == Some(&open.quote) {
                        string = None;
                        i += 2;
                    }
                }
                i += 1;
                continue;
            }

            match c {
                '#' => break,
                '"' | '\'' => {
                    let triple = chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&c);
                    string = Some(OpenString {
                        quote: c,
                        triple,
                        line: number,
                    });
                    if triple {
                        i += 2;
                    }
                    last_code = Some(c);
                }
                '(' | '[' | '{' => {
                    brackets.push((c, number));
                    last_code = Some(c);
                }
                ')' | ']' | '}' => {
                    match brackets.pop() {
                        Some((open, _)) if closing(open) == c => {}
                        Some((open, line)) => {
                            return Err(fail(
                                format!("closing '{c}' does not match '{open}' opened on line {line}"),
                                number,
                            ));
                        }
                        None => return Err(fail(format!("unmatched '{c}'"), number)),
                    }
                    last_code = Some(c);
                }
                c if c.is_whitespace() => {}
                other => last_code = Some(other),
            }
            i += 1;
        }

        if let Some(open) = string {
            if !open.triple {
                return Err(fail("unterminated string literal", open.line));
            }
        }
        if string.is_none() && last_code == Some('\\') {
            continuation = true;
        }

        if brackets.is_empty() && string.is_none() && !continuation {
            if let Some(mut line) = current.take() {
                line.opens_block = last_code == Some(':');
                lines.push(line);
            }
        }
    }

    if let Some(open) = string {
        return Err(fail("unterminated triple-quoted string", open.line));
    }
    if let Some((open, line)) = brackets.pop() {
        return Err(fail(format!("'{open}' was never closed"), line));
    }
    Ok(lines)
}

/// Check that `source` is structurally valid Python
///
/// # Errors
///
/// Returns [`GeneratorError::Compilation`] with the offending line.
pub fn check_python_source(source: &str) -> GeneratorResult<()> {
    let lines = logical_lines(source)?;
    let mut indents: Vec<usize> = vec![0];
    let mut expect_block = false;

    for line in &lines {
        let top = indents.last().copied().unwrap_or(0);
        if expect_block {
            if line.indent <= top {
                return Err(fail("expected an indented block", line.number));
            }
            indents.push(line.indent);
        } else if line.indent > top {
            return Err(fail("unexpected indent", line.number));
        } else {
            while indents.last().is_some_and(|&i| i > line.indent) {
                indents.pop();
            }
            if indents.last().copied() != Some(line.indent) {
                return Err(fail("unindent does not match any outer indentation level", line.number));
            }
        }
        expect_block = line.opens_block;
    }

    if expect_block {
        let number = lines.last().map_or(0, |l| l.number);
        return Err(fail("expected an indented block at end of file", number));
    }
    Ok(())
}
