//! Host AST to Python source text

use super::pyast::{PyModule, PyStmt};
use super::Renderer;

const INDENT: &str = "    ";

#[derive(Debug, Clone, Default)]
pub struct SourcePrinter;

impl SourcePrinter {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for SourcePrinter {
    fn render(&self, module: &PyModule) -> String {
        let mut out = String::new();
        if let Some(doc) = &module.docstring {
            out.push_str(&format!("\"\"\"{}\"\"\"\n", doc.replace("\"\"\"", "\\\"\\\"\\\"")));
            if !module.body.is_empty() {
                out.push('\n');
            }
        }
        print_suite(&mut out, &module.body, 0);
        out
    }
}

/// Blank lines between two adjacent statements: two at top level around
/// definitions, one inside a class or function.
fn separation(prev: &PyStmt, next: &PyStmt, depth: usize) -> usize {
    if !(prev.is_definition() || next.is_definition()) {
        return 0;
    }
    if depth == 0 {
        2
    } else {
        1
    }
}

fn print_suite(out: &mut String, body: &[PyStmt], depth: usize) {
    if body.is_empty() {
        print_line(out, "pass", depth);
        return;
    }
    let mut prev: Option<&PyStmt> = None;
    for stmt in body {
        if let Some(prev) = prev {
            for _ in 0..separation(prev, stmt, depth) {
                out.push('\n');
            }
        }
        print_stmt(out, stmt, depth);
        prev = Some(stmt);
    }
}

fn print_line(out: &mut String, line: &str, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(line);
    out.push('\n');
}

fn header(text: &str) -> String {
    let text = text.trim_end();
    if text.ends_with(':') {
        text.to_string()
    } else {
        format!("{}:", text)
    }
}

fn print_stmt(out: &mut String, stmt: &PyStmt, depth: usize) {
    match stmt {
        PyStmt::Import { module, alias } => match alias {
            Some(alias) => print_line(out, &format!("import {} as {}", module, alias), depth),
            None => print_line(out, &format!("import {}", module), depth),
        },
        PyStmt::ImportFrom { module, names } => {
            let names = if names.is_empty() {
                "*".to_string()
            } else {
                names.join(", ")
            };
            print_line(out, &format!("from {} import {}", module, names), depth);
        }
        PyStmt::ClassDef { name, bases, body } => {
            let line = if bases.is_empty() {
                format!("class {}:", name)
            } else {
                format!("class {}({}):", name, bases.join(", "))
            };
            print_line(out, &line, depth);
            print_suite(out, body, depth + 1);
        }
        PyStmt::FunctionDef { name, params, body } => {
            print_line(out, &format!("def {}({}):", name, params.join(", ")), depth);
            print_suite(out, body, depth + 1);
        }
        PyStmt::Block { header: text, body } => {
            print_line(out, &header(text), depth);
            print_suite(out, body, depth + 1);
        }
        PyStmt::Assign { target, value } => {
            print_line(out, &format!("{} = {}", target, value), depth);
        }
        PyStmt::Global(names) => print_line(out, &format!("global {}", names.join(", ")), depth),
        PyStmt::Return(Some(value)) => print_line(out, &format!("return {}", value), depth),
        PyStmt::Return(None) => print_line(out, "return", depth),
        PyStmt::Expr(text) => print_line(out, text, depth),
        PyStmt::Comment(text) => print_line(out, &format!("# {}", text), depth),
        PyStmt::Pass => print_line(out, "pass", depth),
    }
}
