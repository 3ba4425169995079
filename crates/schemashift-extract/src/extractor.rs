use ast_grep_core::matcher::KindMatcher;
use ast_grep_core::{Doc, Node};
use ast_grep_language::{LanguageExt, SupportLang};

use schemashift_core::{FieldDeclaration, SkippedLine, TableDeclaration};

use crate::dialect::{Dialect, resolve_dialect};
use crate::options::ExtractOptions;

/// Result of scanning one source document.
#[derive(Debug)]
pub struct Extraction {
    pub dialect: &'static dyn Dialect,
    /// Table declarations in document order.
    pub tables: Vec<TableDeclaration>,
    /// Entries that could not be read as `name: expression`.
    pub skipped: Vec<SkippedLine>,
}

/// Why a recognised table declaration produced no table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unreadable {
    /// The call is not `ctor("name", { ... })`.
    Header,
    /// The call contains syntax errors, usually an unclosed bracket.
    Damaged,
}

/// Extract every recognisable table block from `source`.
///
/// Extraction is best-effort: malformed declarations and field entries are
/// recorded in [`Extraction::skipped`] and scanning continues.
pub fn extract_tables(source: &str, opts: &ExtractOptions) -> Extraction {
    let dialect = resolve_dialect(opts.dialect, source);
    let lang = SupportLang::TypeScript;
    let root = lang.ast_grep(source);

    let mut tables = Vec::new();
    let mut skipped = Vec::new();

    for declaration in root
        .root()
        .find_all(KindMatcher::new("lexical_declaration", lang))
    {
        let declarators = declaration
            .children()
            .filter(|child| child.kind().as_ref() == "variable_declarator");
        for declarator in declarators {
            let Some(call) = table_call(&declarator, dialect) else {
                continue;
            };
            let Some(ident) = declarator.field("name").map(|name| name.text().to_string()) else {
                continue;
            };
            let line = line_of(&declaration);

            match read_table(&ident, line, &call, opts.include_indexes, &mut skipped) {
                Ok(table) => {
                    tracing::debug!(
                        event = "table_extracted",
                        table = %table.ident,
                        fields = table.fields.len(),
                        indexes = table.index_descriptors.len()
                    );
                    tables.push(table);
                }
                Err(reason) => {
                    match reason {
                        Unreadable::Header => {
                            tracing::warn!(event = "table_header_unreadable", table = %ident, line)
                        }
                        Unreadable::Damaged => {
                            tracing::warn!(event = "table_block_unterminated", table = %ident, line)
                        }
                    }
                    skipped.push(SkippedLine {
                        table: ident,
                        line,
                        text: header_text(&declaration),
                    });
                }
            }
        }
    }

    tracing::info!(
        event = "extraction_finished",
        dialect = dialect.name(),
        tables = tables.len(),
        skipped = skipped.len()
    );

    Extraction {
        dialect,
        tables,
        skipped,
    }
}

/// The declarator's value when it is a call to the dialect's table constructor.
fn table_call<'r, D: Doc>(declarator: &Node<'r, D>, dialect: &dyn Dialect) -> Option<Node<'r, D>> {
    let value = declarator.field("value")?;
    if value.kind().as_ref() != "call_expression" {
        return None;
    }
    let function = value.field("function")?;
    (function.text() == dialect.table_constructor()).then_some(value)
}

fn read_table<D: Doc>(
    ident: &str,
    line: usize,
    call: &Node<D>,
    include_indexes: bool,
    skipped: &mut Vec<SkippedLine>,
) -> Result<TableDeclaration, Unreadable> {
    if is_damaged(call) {
        return Err(Unreadable::Damaged);
    }

    let arguments = call.field("arguments").ok_or(Unreadable::Header)?;
    let mut args = arguments.children().filter(is_element);
    let table_name = args
        .next()
        .and_then(|arg| string_literal(&arg))
        .ok_or(Unreadable::Header)?;
    let body = args
        .next()
        .filter(|arg| arg.kind().as_ref() == "object")
        .ok_or(Unreadable::Header)?;
    let extra = args.next();

    let mut fields = Vec::new();
    for entry in body.children().filter(is_element) {
        let entry_line = line_of(&entry);
        match field_entry(&entry, entry_line) {
            Some(field) => fields.push(field),
            None => {
                tracing::debug!(event = "field_line_skipped", table = %ident, line = entry_line);
                skipped.push(SkippedLine {
                    table: ident.to_string(),
                    line: entry_line,
                    text: flatten(&entry),
                });
            }
        }
    }

    let (index_block, index_descriptors) = match extra {
        Some(extra) if include_indexes => {
            let descriptors = index_elements(&extra)
                .into_iter()
                .filter(|text| text.contains("index(") || text.contains("uniqueIndex("))
                .collect();
            (Some(extra.text().to_string()), descriptors)
        }
        _ => (None, Vec::new()),
    };

    Ok(TableDeclaration {
        ident: ident.to_string(),
        table_name,
        line,
        fields,
        index_block,
        index_descriptors,
    })
}

/// Read one `pair` of the field object. Only plain identifier keys qualify.
fn field_entry<D: Doc>(entry: &Node<D>, line: usize) -> Option<FieldDeclaration> {
    if entry.kind().as_ref() != "pair" {
        return None;
    }
    let key = entry.field("key")?;
    if key.kind().as_ref() != "property_identifier" {
        return None;
    }
    let value = entry.field("value")?;

    Some(FieldDeclaration {
        name: key.text().to_string(),
        expression: flatten(&value),
        line,
    })
}

/// Top-level elements of an index block, each flattened to one line.
///
/// Accepts `(t) => ({ ... })`, `(t) => [ ... ]`, and a block body that
/// returns either form.
fn index_elements<D: Doc>(node: &Node<D>) -> Vec<String> {
    match node.kind().as_ref() {
        "arrow_function" | "function_expression" => node
            .field("body")
            .map(|body| index_elements(&body))
            .unwrap_or_default(),
        "parenthesized_expression" => node
            .children()
            .find(is_element)
            .map(|inner| index_elements(&inner))
            .unwrap_or_default(),
        "statement_block" => node
            .children()
            .find(|child| child.kind().as_ref() == "return_statement")
            .and_then(|ret| ret.children().find(is_element))
            .map(|value| index_elements(&value))
            .unwrap_or_default(),
        "object" | "array" => node
            .children()
            .filter(is_element)
            .map(|element| flatten(&element))
            .collect(),
        _ => vec![flatten(node)],
    }
}

fn string_literal<D: Doc>(node: &Node<D>) -> Option<String> {
    let text = match node.kind().as_ref() {
        "string" => node
            .children()
            .find(|child| child.kind().as_ref() == "string_fragment")?
            .text()
            .to_string(),
        "template_string" if !has_substitution(node) => node.text().trim_matches('`').to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn has_substitution<D: Doc>(node: &Node<D>) -> bool {
    node.children()
        .any(|child| child.kind().as_ref() == "template_substitution")
}

/// Separators and comments are not elements.
fn is_element<D: Doc>(node: &Node<D>) -> bool {
    node.is_named() && node.kind().as_ref() != "comment"
}

/// Error nodes and zero-width (missing) tokens mark a region tree-sitter
/// had to recover from.
fn is_damaged<D: Doc>(node: &Node<D>) -> bool {
    node.kind().as_ref() == "ERROR"
        || (node.is_leaf() && node.range().is_empty())
        || node.children().any(|child| is_damaged(&child))
}

/// Node text with comments removed and whitespace squashed to one line.
fn flatten<D: Doc>(node: &Node<D>) -> String {
    let text = node.text();
    let base = node.range().start;
    let mut comments = Vec::new();
    comment_ranges(node, &mut comments);
    if comments.is_empty() {
        return squash_whitespace(&text);
    }

    let mut clean = String::with_capacity(text.len());
    let mut cursor = 0;
    for range in comments {
        let (start, end) = (range.start - base, range.end - base);
        if start < cursor {
            continue;
        }
        clean.push_str(&text[cursor..start]);
        clean.push(' ');
        cursor = end;
    }
    clean.push_str(&text[cursor..]);
    squash_whitespace(&clean)
}

fn comment_ranges<D: Doc>(node: &Node<D>, out: &mut Vec<std::ops::Range<usize>>) {
    for child in node.children() {
        if child.kind().as_ref() == "comment" {
            out.push(child.range());
        } else {
            comment_ranges(&child, out);
        }
    }
}

/// Collapse whitespace runs outside literals into single spaces.
fn squash_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut pending_space = false;

    for ch in text.trim().chars() {
        if let Some(q) = quote {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if matches!(ch, '"' | '\'' | '`') {
            quote = Some(ch);
        }
        out.push(ch);
    }

    out
}

fn line_of<D: Doc>(node: &Node<D>) -> usize {
    node.start_pos().line() + 1
}

fn header_text<D: Doc>(declaration: &Node<D>) -> String {
    declaration
        .text()
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
