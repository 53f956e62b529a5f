//! Top-level function signature extraction.
//!
//! Only direct children of the program node count: function expressions,
//! arrow functions, class methods, nested functions and `export`-wrapped
//! declarations are not listed.

use tree_sitter::{Node, Parser};
use tracing::debug;

use crate::contract::{FunctionSignature, ParseError, SignatureExtractor};

const DECLARATION_KINDS: [&str; 2] = ["function_declaration", "generator_function_declaration"];

/// [`SignatureExtractor`] for JavaScript (CommonJS or ES module) source.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavascriptExtractor;

impl SignatureExtractor for JavascriptExtractor {
    fn extract(&self, source: &str) -> Result<Vec<FunctionSignature>, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(tree_sitter_javascript::language())
            .map_err(|e| ParseError(format!("incompatible grammar: {e:?}")))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError("parser returned no tree".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseError(describe_first_error(root)));
        }

        let bytes = source.as_bytes();
        let mut cursor = root.walk();
        let functions: Vec<FunctionSignature> = root
            .named_children(&mut cursor)
            .filter(|node| DECLARATION_KINDS.contains(&node.kind()))
            .filter_map(|node| signature_of(node, bytes))
            .collect();

        debug!(count = functions.len(), "[PARSE] Extracted top-level functions");
        Ok(functions)
    }
}

fn signature_of(node: Node<'_>, source: &[u8]) -> Option<FunctionSignature> {
    let name = node.child_by_field_name("name")?.utf8_text(source).ok()?;

    let params = match node.child_by_field_name("parameters") {
        Some(list) => {
            let mut cursor = list.walk();
            list.named_children(&mut cursor)
                .filter(|p| p.kind() != "comment")
                .map(|p| param_name(p, source))
                .collect()
        }
        None => Vec::new(),
    };

    Some(FunctionSignature {
        name: name.to_string(),
        params,
        start: node.start_byte(),
        end: node.end_byte(),
        description: doc_comment(node, source),
    })
}

fn param_name(param: Node<'_>, source: &[u8]) -> String {
    let target = match param.kind() {
        "assignment_pattern" => param.child_by_field_name("left"),
        "rest_pattern" => param.named_child(0),
        _ => None,
    }
    .filter(|n| n.kind() == "identifier")
    .unwrap_or(param);

    target.utf8_text(source).unwrap_or_default().to_string()
}

/// Body of a `/** ... */` comment ending on the line just above `node`.
fn doc_comment(node: Node<'_>, source: &[u8]) -> Option<String> {
    let comment = node.prev_named_sibling()?;
    if comment.kind() != "comment" || comment.end_position().row + 1 < node.start_position().row {
        return None;
    }
    let text = comment.utf8_text(source).ok()?;
    let body = text.strip_prefix("/**")?.strip_suffix("*/")?;

    let cleaned: Vec<&str> = body
        .lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix('*').map(str::trim_start).unwrap_or(line)
        })
        .filter(|line| !line.is_empty())
        .collect();

    (!cleaned.is_empty()).then(|| cleaned.join("\n"))
}

fn describe_first_error(root: Node<'_>) -> String {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return format!("syntax error at line {}, column {}", pos.row + 1, pos.column + 1);
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    "syntax error".to_string()
}
