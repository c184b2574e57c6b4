//! Static extraction of function bodies from submission source text.
//!
//! Two shapes of function are recognised:
//! - `fn name(...) ... { ... }`, delimited by balanced braces
//! - `def name(...):`, delimited by indentation
//!
//! Braces inside string literals, char literals and comments do not count
//! towards nesting. Bodiless declarations (`fn name(...);`) are skipped.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::GradeError;
use crate::inventory::Operation;

/// Source text of a graded submission.
#[derive(Debug, Clone)]
pub struct SubmissionSource {
    text: String,
}

impl SubmissionSource {
    /// Wraps in-memory source text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Reads a submission from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GradeError> {
        Ok(Self::new(fs::read_to_string(path)?))
    }

    /// Full source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Source text of the function implementing `op`.
    pub fn function(&self, op: Operation) -> Result<&str, GradeError> {
        extract_function(&self.text, op.function_name())
    }
}

/// Returns the text of function `name`, from its keyword to the end of its body.
pub fn extract_function<'a>(source: &'a str, name: &str) -> Result<&'a str, GradeError> {
    let header = Regex::new(&format!(r"\b(fn|def)\s+{}\b", regex::escape(name)))?;

    for caps in header.captures_iter(source) {
        let Some(whole) = caps.get(0) else { continue };
        let body_end = match &caps[1] {
            "def" => Some(indented_block_end(source, whole.start())),
            _ => braced_block_end(source, whole.end(), name)?,
        };
        if let Some(end) = body_end {
            return Ok(&source[whole.start()..end]);
        }
    }

    Err(GradeError::FunctionNotFound(name.to_string()))
}

/// Finds the end of a brace-delimited body starting the search at `from`.
///
/// Returns `Ok(None)` when a `;` at nesting depth zero shows this is a
/// declaration without a body.
fn braced_block_end(source: &str, from: usize, name: &str) -> Result<Option<usize>, GradeError> {
    let chars: Vec<(usize, char)> = source[from..].char_indices().collect();
    let mut depth = 0usize;
    let mut parens = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        let next = chars.get(i + 1).map(|&(_, n)| n);

        match c {
            '/' if next == Some('/') => {
                while i < chars.len() && chars[i].1 != '\n' {
                    i += 1;
                }
                continue;
            }
            '/' if next == Some('*') => {
                i += 2;
                while i + 1 < chars.len() && !(chars[i].1 == '*' && chars[i + 1].1 == '/') {
                    i += 1;
                }
                i += 2;
                continue;
            }
            '"' => {
                i += 1;
                while i < chars.len() && chars[i].1 != '"' {
                    if chars[i].1 == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            '\'' => {
                // Char literal; anything else is a lifetime and is left alone.
                if next == Some('\\') {
                    i += 3;
                    while i < chars.len() && chars[i].1 != '\'' {
                        i += 1;
                    }
                } else if chars.get(i + 2).map(|&(_, n)| n) == Some('\'') {
                    i += 2;
                }
            }
            '(' => parens += 1,
            ')' => parens = parens.saturating_sub(1),
            ';' if depth == 0 && parens == 0 => return Ok(None),
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(Some(from + offset + c.len_utf8()));
                }
            }
            _ => {}
        }
        i += 1;
    }

    if depth > 0 {
        return Err(GradeError::UnterminatedFunction(name.to_string()));
    }
    Ok(None)
}

/// Finds the end of an indentation-delimited body whose header starts at `start`.
fn indented_block_end(source: &str, start: usize) -> usize {
    let line_start = source[..start].rfind('\n').map_or(0, |p| p + 1);
    let header_indent = indent_width(&source[line_start..]);

    let Some(header_end) = source[start..].find('\n').map(|p| start + p + 1) else {
        return source.len();
    };

    let mut end = header_end;
    let mut cursor = header_end;
    for line in source[header_end..].split_inclusive('\n') {
        if !line.trim().is_empty() {
            if indent_width(line) <= header_indent {
                break;
            }
            end = cursor + line.len();
        }
        cursor += line.len();
    }

    end
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_rust_function() {
        let src = r#"
impl Inventory for Store {
    fn add_item(&mut self, name: &str, qty: u64) -> Result<StockMap, SubmissionError> {
        if let Some(s) = self.items.get_mut(name) {
            *s += qty;
        }
        Ok(self.items.clone())
    }

    fn update_stock(&mut self, name: &str, qty: u64) -> Result<StockMap, SubmissionError> {
        todo!()
    }
}
"#;
        let body = extract_function(src, "add_item").expect("found");
        assert!(body.starts_with("fn add_item"));
        assert!(body.ends_with('}'));
        assert!(body.contains("+= qty"));
        assert!(!body.contains("update_stock"));
    }

    #[test]
    fn test_extract_skips_declarations() {
        let src = r#"
trait Inventory {
    fn get_item_stock(&self, name: &str) -> Result<u64, SubmissionError>;
}
impl Inventory for Store {
    fn get_item_stock(&self, name: &str) -> Result<u64, SubmissionError> {
        Ok(self.items.get(name).copied().unwrap_or(0))
    }
}
"#;
        let body = extract_function(src, "get_item_stock").expect("found");
        assert!(body.contains("unwrap_or(0)"));
    }

    #[test]
    fn test_braces_in_literals_are_ignored() {
        let src = r#"
fn get_available_items(&self) -> Result<Vec<String>, E> {
    let open = '{';
    let text = "}}}";
    // }
    /* } */
    Ok(vec![format!("{}{}", open, text)])
}
fn after() {}
"#;
        let body = extract_function(src, "get_available_items").expect("found");
        assert!(body.contains("Ok(vec!"));
        assert!(!body.contains("fn after"));
    }

    #[test]
    fn test_lifetimes_do_not_confuse_scanner() {
        let src = "fn add_item<'a>(&'a mut self, name: &'a str) -> &'a str { name }\nfn other() {}";
        let body = extract_function(src, "add_item").expect("found");
        assert!(body.ends_with("{ name }"));
    }

    #[test]
    fn test_extract_python_function() {
        let src = "class InventoryManagementSystem:\n    def add_item(self, name, qty):\n        if name in self.items:\n            self.items[name] += qty\n\n        return self.items\n\n    def update_stock(self, name, qty):\n        pass\n";
        let body = extract_function(src, "add_item").expect("found");
        assert!(body.starts_with("def add_item"));
        assert!(body.contains("return self.items"));
        assert!(!body.contains("update_stock"));
    }

    #[test]
    fn test_missing_function() {
        let err = extract_function("fn unrelated() {}", "add_item").unwrap_err();
        assert!(matches!(err, GradeError::FunctionNotFound(name) if name == "add_item"));
    }

    #[test]
    fn test_prefix_names_do_not_match() {
        let src = "fn add_item_twice() { }\nfn add_item() { real() }";
        let body = extract_function(src, "add_item").expect("found");
        assert!(body.contains("real()"));
    }

    #[test]
    fn test_unterminated_body() {
        let err = extract_function("fn add_item() { if x {", "add_item").unwrap_err();
        assert!(matches!(err, GradeError::UnterminatedFunction(_)));
    }

    #[test]
    fn test_submission_source_by_operation() {
        let source = SubmissionSource::new("fn get_item_stock(&self) -> u64 { 0 }");
        let body = source.function(Operation::GetItemStock).expect("found");
        assert_eq!(body, "fn get_item_stock(&self) -> u64 { 0 }");
        assert!(source.function(Operation::AddItem).is_err());
    }
}
