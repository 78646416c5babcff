//! Structural parser for DistPy sources
//!
//! Works in three passes over the text:
//! 1. physical lines are joined into logical lines (open brackets, open
//!    triple-quoted strings and trailing backslashes continue a line),
//! 2. logical lines are nested into blocks by indentation,
//! 3. process classes and their methods are lifted out of the block tree.
//!
//! Every problem becomes a `Diagnostic`; the parser never stops early, so a
//! single run reports everything it can find.

use super::ast::{Item, Method, Module, Process, Stmt};
use super::{Diagnostic, FrontEnd, FrontEndError, ParseResult, SourceReader};
use crate::config::constants::PROCESS_BASE_CLASS;
use crate::logging::{codes, Code};
use crate::pipeline::Session;
use crate::utils::{SourceMap, Span};
use crate::{log_debug, log_error, log_warning};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

const TAB_WIDTH: usize = 8;

fn class_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^class\s+([A-Za-z_]\w*)\s*(?:\((.*)\))?\s*:$")
            .expect("class header pattern is valid")
    })
}

fn def_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^def\s+([A-Za-z_]\w*)\s*\((.*)\)\s*(?:->[^:]*)?:$")
            .expect("def header pattern is valid")
    })
}

/// Line/indentation based front end
#[derive(Debug, Clone, Default)]
pub struct StructuralParser {
    reader: SourceReader,
}

impl StructuralParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reader(reader: SourceReader) -> Self {
        Self { reader }
    }

    /// Parse already-loaded source text
    pub fn parse_source(&self, module_name: &str, source: &str) -> ParseResult {
        let map = SourceMap::new(source.to_string());
        let mut diagnostics = Diagnostics::default();

        let mut lines = logical_lines(&map, &mut diagnostics);
        let mut levels = vec![0];
        let mut pos = 0;
        let block = build_block(&mut lines, &mut pos, 0, &mut levels, &mut diagnostics);

        let mut module = Module::new(module_name);
        module.items = lift_items(block, &mut diagnostics);

        log_debug!("Structural parse finished",
            "module" => module_name,
            "logical_lines" => lines.len(),
            "items" => module.items.len());

        ParseResult::new(module, diagnostics.into_inner())
    }
}

impl FrontEnd for StructuralParser {
    fn parse(&self, path: &Path, session: &Session) -> Result<ParseResult, FrontEndError> {
        let file = self.reader.read(path)?;
        let module_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let result = self.parse_source(&module_name, &file.text);
        if session.debug_level.is_debug() {
            for process in result.ast.processes() {
                log_debug!("Parsed process",
                    "name" => process.name,
                    "methods" => process.methods.len(),
                    "handlers" => process.handlers().count());
            }
        }
        Ok(result)
    }
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

#[derive(Default)]
struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    fn error(&mut self, code: Code, message: String, span: Option<Span>) {
        match span {
            Some(span) => log_error!(code, &message, span = span),
            None => log_error!(code, &message),
        }
        self.items.push(Diagnostic::error(code, message, span));
    }

    fn warning(&mut self, code: Code, message: String, span: Option<Span>) {
        log_warning!(code = code, &message);
        self.items.push(Diagnostic::warning(code, message, span));
    }

    fn into_inner(self) -> Vec<Diagnostic> {
        self.items
    }
}

// ============================================================================
// PASS 1: LOGICAL LINES
// ============================================================================

#[derive(Debug, Clone)]
struct LogicalLine {
    indent: usize,
    text: String,
    span: Span,
}

struct PendingLine {
    indent: usize,
    start: usize,
    end: usize,
    text: String,
}

#[derive(Clone, Copy)]
struct OpenString {
    quote: char,
    triple: bool,
    start: usize,
}

fn span_at(map: &SourceMap, offset: usize, len: usize) -> Option<Span> {
    Some(Span::new(
        map.position_at(offset),
        map.position_at(offset + len),
    ))
}

fn closer(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

fn measure_indent(prefix: &str) -> usize {
    prefix.chars().fold(0, |width, c| {
        if c == '\t' {
            (width / TAB_WIDTH + 1) * TAB_WIDTH
        } else {
            width + 1
        }
    })
}

fn logical_lines(map: &SourceMap, diagnostics: &mut Diagnostics) -> Vec<LogicalLine> {
    let source = map.source.as_str();
    let mut lines = Vec::new();
    let mut pending: Option<PendingLine> = None;
    let mut brackets: Vec<(char, usize)> = Vec::new();
    let mut string: Option<OpenString> = None;
    let mut offset = 0;

    for raw in source.split_inclusive('\n') {
        let line_start = offset;
        offset += raw.len();
        let line = raw.trim_end_matches(|c| c == '\n' || c == '\r');

        let mut content_start = 0;
        if pending.is_none() {
            let body = line.trim_start_matches(|c| c == ' ' || c == '\t');
            if body.is_empty() || body.starts_with('#') {
                continue;
            }
            let prefix = &line[..line.len() - body.len()];
            if prefix.contains(' ') && prefix.contains('\t') {
                diagnostics.error(
                    codes::frontend::INCONSISTENT_INDENTATION,
                    "Inconsistent use of tabs and spaces in indentation".to_string(),
                    span_at(map, line_start, prefix.len()),
                );
            }
            content_start = prefix.len();
            pending = Some(PendingLine {
                indent: measure_indent(prefix),
                start: line_start + content_start,
                end: line_start + content_start,
                text: String::new(),
            });
        }
        let Some(current) = pending.as_mut() else {
            continue;
        };

        let segment = &line[content_start..];
        let segment_start = line_start + content_start;
        let mut kept_end = segment.len();
        let mut continued = false;
        let mut chars = segment.char_indices();

        while let Some((i, c)) = chars.next() {
            if let Some(open) = string {
                if c == '\\' {
                    chars.next();
                } else if c == open.quote {
                    if !open.triple {
                        string = None;
                    } else if segment[i..].starts_with(&open.quote.to_string().repeat(3)) {
                        chars.next();
                        chars.next();
                        string = None;
                    }
                }
                continue;
            }

            match c {
                '#' => {
                    kept_end = i;
                    break;
                }
                '\'' | '"' => {
                    let triple = segment[i..].starts_with(&c.to_string().repeat(3));
                    if triple {
                        chars.next();
                        chars.next();
                    }
                    string = Some(OpenString {
                        quote: c,
                        triple,
                        start: segment_start + i,
                    });
                }
                '(' | '[' | '{' => brackets.push((c, segment_start + i)),
                ')' | ']' | '}' => match brackets.last() {
                    Some(&(open, _)) if closer(open) == c => {
                        brackets.pop();
                    }
                    _ => diagnostics.error(
                        codes::frontend::UNBALANCED_BRACKETS,
                        format!("Unmatched closing '{}'", c),
                        span_at(map, segment_start + i, 1),
                    ),
                },
                '\\' if i + 1 == segment.len() => {
                    continued = true;
                    kept_end = i;
                }
                _ => {}
            }
        }

        if let Some(open) = string {
            if !open.triple && !segment.ends_with('\\') {
                diagnostics.error(
                    codes::frontend::UNTERMINATED_STRING,
                    "Unterminated string literal".to_string(),
                    span_at(map, open.start, 1),
                );
                string = None;
            }
        }

        let kept = segment[..kept_end].trim_end();
        if !current.text.is_empty() || current.end > current.start {
            current.text.push('\n');
        }
        current.text.push_str(kept);
        if !kept.is_empty() {
            current.end = segment_start + kept.len();
        }

        if !continued && brackets.is_empty() && string.is_none() {
            if let Some(done) = pending.take() {
                lines.push(finish_line(map, done));
            }
        }
    }

    if let Some(open) = string {
        diagnostics.error(
            codes::frontend::UNTERMINATED_STRING,
            "Unterminated triple-quoted string literal".to_string(),
            span_at(map, open.start, 3),
        );
    }
    if let Some(&(open, at)) = brackets.first() {
        diagnostics.error(
            codes::frontend::UNBALANCED_BRACKETS,
            format!("Unclosed '{}'", open),
            span_at(map, at, 1),
        );
    }
    if let Some(done) = pending.take() {
        lines.push(finish_line(map, done));
    }

    lines
}

fn finish_line(map: &SourceMap, line: PendingLine) -> LogicalLine {
    LogicalLine {
        indent: line.indent,
        text: line.text,
        span: Span::new(map.position_at(line.start), map.position_at(line.end)),
    }
}

// ============================================================================
// PASS 2: BLOCKS
// ============================================================================

fn build_block(
    lines: &mut [LogicalLine],
    pos: &mut usize,
    indent: usize,
    levels: &mut Vec<usize>,
    diagnostics: &mut Diagnostics,
) -> Vec<Stmt> {
    let mut block = Vec::new();

    while *pos < lines.len() {
        let line_indent = lines[*pos].indent;

        if line_indent < indent {
            if !levels.contains(&line_indent) {
                diagnostics.error(
                    codes::frontend::INCONSISTENT_INDENTATION,
                    "Unindent does not match any outer indentation level".to_string(),
                    Some(lines[*pos].span),
                );
                lines[*pos].indent = levels
                    .iter()
                    .copied()
                    .filter(|level| *level < line_indent)
                    .max()
                    .unwrap_or(0);
            }
            break;
        }

        if line_indent > indent {
            diagnostics.error(
                codes::frontend::INCONSISTENT_INDENTATION,
                "Unexpected indent".to_string(),
                Some(lines[*pos].span),
            );
            levels.push(line_indent);
            let nested = build_block(lines, pos, line_indent, levels, diagnostics);
            levels.pop();
            block.extend(nested);
            continue;
        }

        let line = &lines[*pos];
        let mut stmt = Stmt::new(line.text.clone()).with_span(line.span);
        *pos += 1;

        if stmt.opens_block() {
            match lines.get(*pos).map(|next| next.indent) {
                Some(next) if next > indent => {
                    levels.push(next);
                    stmt.body = build_block(lines, pos, next, levels, diagnostics);
                    levels.pop();
                }
                _ => diagnostics.error(
                    codes::frontend::INCONSISTENT_INDENTATION,
                    "Expected an indented block".to_string(),
                    stmt.span,
                ),
            }
        }

        block.push(stmt);
    }

    block
}

// ============================================================================
// PASS 3: DECLARATIONS
// ============================================================================

/// Split on commas outside brackets
pub(crate) fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        parts.push(tail);
    }
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

fn param_name(param: &str) -> String {
    param
        .trim_start_matches('*')
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

fn parse_method(stmt: Stmt, diagnostics: &mut Diagnostics) -> Result<Method, Stmt> {
    let Some(captures) = def_header().captures(&stmt.text) else {
        diagnostics.error(
            codes::frontend::MALFORMED_DECLARATION,
            format!("Malformed function declaration '{}'", stmt.text),
            stmt.span,
        );
        return Err(stmt);
    };

    let name = captures[1].to_string();
    let params = split_top_level(&captures[2])
        .into_iter()
        .map(param_name)
        .filter(|p| !p.is_empty())
        .collect();

    Ok(Method {
        name,
        params,
        span: stmt.span,
        body: stmt.body,
    })
}

fn is_process_base(base: &str) -> bool {
    base.rsplit('.').next().map(str::trim) == Some(PROCESS_BASE_CLASS)
}

fn parse_class(stmt: Stmt, diagnostics: &mut Diagnostics) -> Item {
    let Some(captures) = class_header().captures(&stmt.text) else {
        diagnostics.error(
            codes::frontend::MALFORMED_DECLARATION,
            format!("Malformed class declaration '{}'", stmt.text),
            stmt.span,
        );
        return Item::Stmt(stmt);
    };

    let name = captures[1].to_string();
    let bases: Vec<String> = captures
        .get(2)
        .map(|m| {
            split_top_level(m.as_str())
                .into_iter()
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if !bases.iter().any(|b| is_process_base(b)) {
        return Item::Stmt(stmt);
    }

    let mut methods = Vec::new();
    let mut members = Vec::new();
    for member in stmt.body {
        if member.text.starts_with("def ") || member.text == "def" {
            match parse_method(member, diagnostics) {
                Ok(method) => methods.push(method),
                Err(member) => members.push(member),
            }
        } else {
            members.push(member);
        }
    }

    Item::Process(Process {
        name,
        bases,
        span: stmt.span,
        methods,
        members,
    })
}

fn lift_items(block: Vec<Stmt>, diagnostics: &mut Diagnostics) -> Vec<Item> {
    let mut items = Vec::new();
    let mut seen: HashMap<String, Option<Span>> = HashMap::new();

    for stmt in block {
        let item = if stmt.text.starts_with("class ") || stmt.text == "class" {
            parse_class(stmt, diagnostics)
        } else if stmt.text.starts_with("def ") || stmt.text == "def" {
            match parse_method(stmt, diagnostics) {
                Ok(method) => Item::Function(method),
                Err(stmt) => Item::Stmt(stmt),
            }
        } else {
            Item::Stmt(stmt)
        };

        if let Item::Process(process) = &item {
            if let Some(first) = seen.get(&process.name) {
                let first_line = first.map(|s| s.start.line).unwrap_or_default();
                diagnostics.error(
                    codes::frontend::DUPLICATE_PROCESS,
                    format!(
                        "Process '{}' is already defined on line {}",
                        process.name, first_line
                    ),
                    process.span,
                );
            } else {
                seen.insert(process.name.clone(), process.span);
            }

            if process.setup().is_none() {
                diagnostics.warning(
                    codes::frontend::MISSING_SETUP,
                    format!("Process '{}' has no setup method", process.name),
                    process.span,
                );
            }
        }

        items.push(item);
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::MethodKind;
    use assert_matches::assert_matches;

    const RING: &str = "\
import sys

class P(DistProcess):
    def setup(self, ps):
        self.peers = ps   # neighbours

    def main(self):
        if some(p in self.peers, has=p > 0):
            send(Ping(), to=self.peers)

    def OnPing(self, n):
        output(n)

def main():
    ps = createprocs(P, 3)
    start(ps)
";

    fn parse(source: &str) -> ParseResult {
        StructuralParser::new().parse_source("ring", source)
    }

    #[test]
    fn test_parses_process_structure() {
        let result = parse(RING);
        assert_eq!(result.errcnt, 0, "{:?}", result.diagnostics);
        assert_eq!(result.warncnt, 0);

        let process = result.ast.process("P").unwrap();
        assert_eq!(process.bases, vec!["DistProcess"]);
        assert_eq!(process.methods.len(), 3);
        assert_eq!(process.setup().unwrap().args(), ["ps"]);
        assert_eq!(
            process.method("OnPing").unwrap().kind(),
            MethodKind::Handler {
                message: "Ping".to_string()
            }
        );

        let main = process.main().unwrap();
        assert_eq!(main.body.len(), 1);
        assert_eq!(main.body[0].body[0].text, "send(Ping(), to=self.peers)");

        assert_matches!(result.ast.items[0], Item::Stmt(ref s) if s.text == "import sys");
        assert_matches!(result.ast.items[2], Item::Function(ref f) if f.name == "main");
    }

    #[test]
    fn test_comments_are_stripped() {
        let result = parse(RING);
        let setup = result.ast.process("P").unwrap().setup().unwrap();
        assert_eq!(setup.body[0].text, "self.peers = ps");
    }

    #[test]
    fn test_bracket_continuation_joins_lines() {
        let result = parse("x = foo(1,\n        2)\ny = 3\n");
        assert_eq!(result.errcnt, 0);
        assert_eq!(result.ast.items.len(), 2);
        assert_matches!(result.ast.items[0], Item::Stmt(ref s) if s.text == "x = foo(1,\n        2)");
    }

    #[test]
    fn test_triple_quoted_string_spans_lines() {
        let result = parse("doc = \"\"\"a (\nb\"\"\"\nz = 1\n");
        assert_eq!(result.errcnt, 0, "{:?}", result.diagnostics);
        assert_eq!(result.ast.items.len(), 2);
    }

    #[test]
    fn test_unbalanced_brackets_reported() {
        let result = parse("x = foo(1, 2\n");
        assert_eq!(result.errcnt, 1);
        assert_eq!(result.diagnostics[0].code, codes::frontend::UNBALANCED_BRACKETS);
        assert_eq!(result.diagnostics[0].span.unwrap().start.column, 8);

        let result = parse("x = 1)\n");
        assert_eq!(result.errcnt, 1);
    }

    #[test]
    fn test_unterminated_string_reported() {
        let result = parse("x = 'abc\ny = 2\n");
        assert_eq!(result.errcnt, 1);
        assert_eq!(result.diagnostics[0].code, codes::frontend::UNTERMINATED_STRING);
    }

    #[test]
    fn test_indentation_errors() {
        let unexpected = parse("x = 1\n    y = 2\n");
        assert_eq!(unexpected.errcnt, 1);
        assert_eq!(
            unexpected.diagnostics[0].code,
            codes::frontend::INCONSISTENT_INDENTATION
        );

        let missing_block = parse("if x:\ny = 2\n");
        assert_eq!(missing_block.errcnt, 1);

        let bad_dedent = parse("if x:\n    a = 1\n  b = 2\n");
        assert_eq!(bad_dedent.errcnt, 1);
        assert_eq!(
            bad_dedent.diagnostics[0].message,
            "Unindent does not match any outer indentation level"
        );
    }

    #[test]
    fn test_duplicate_process_and_missing_setup() {
        let source = "\
class P(DistProcess):
    def main(self):
        pass
class P(DistProcess):
    def setup(self):
        pass
";
        let result = parse(source);
        assert_eq!(result.errcnt, 1);
        assert_eq!(result.warncnt, 1);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == codes::frontend::DUPLICATE_PROCESS));
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == codes::frontend::MISSING_SETUP));
    }

    #[test]
    fn test_malformed_declaration() {
        let result = parse("def broken:\n    pass\n");
        assert_eq!(result.errcnt, 1);
        assert_eq!(
            result.diagnostics[0].code,
            codes::frontend::MALFORMED_DECLARATION
        );
        assert_matches!(result.ast.items[0], Item::Stmt(_));
    }

    #[test]
    fn test_non_process_class_stays_statement() {
        let result = parse("class Msg(object):\n    pass\n");
        assert_eq!(result.errcnt, 0);
        assert_matches!(result.ast.items[0], Item::Stmt(ref s) if s.body.len() == 1);
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("self, a=(1, 2), *rest, **kw"),
            vec!["self", "a=(1, 2)", "*rest", "**kw"]
        );
        assert_eq!(param_name("**kw"), "kw");
        assert_eq!(param_name("n: int = 3"), "n");
    }

    #[test]
    fn test_front_end_reads_file() {
        use crate::pipeline::Session;
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ring.dpy");
        std::fs::write(&path, RING).unwrap();

        let result = StructuralParser::new()
            .parse(&path, &Session::default())
            .unwrap();
        assert_eq!(result.ast.name, "ring");
        assert!(result.is_usable());
    }
}
