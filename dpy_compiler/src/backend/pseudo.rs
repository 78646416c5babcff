//! DistPy AST to algorithm-style pseudocode
//!
//! Processes print as `process` blocks whose lifecycle methods take their
//! pseudocode names (`run`, `receive Msg(args)`). `send(m, to=p)` becomes
//! `send m to p` and quantifications drop their call syntax.

use super::query::rewrite_calls;
use super::PseudoRenderer;
use crate::config::constants::PROCESS_BASE_CLASS;
use crate::frontend::ast::{Item, Method, MethodKind, Module, Process, Stmt};
use crate::frontend::parser::split_top_level;
use regex::Regex;
use std::sync::OnceLock;

const INDENT: &str = "    ";
const QUANTIFIERS: [&str; 2] = ["some", "each"];

fn send_stmt() -> &'static Regex {
    static SEND: OnceLock<Regex> = OnceLock::new();
    SEND.get_or_init(|| {
        Regex::new(r"^send\s*\((?P<msg>.+),\s*to\s*=\s*(?P<to>.+)\)$").expect("valid send regex")
    })
}

fn self_access() -> &'static Regex {
    static SELF: OnceLock<Regex> = OnceLock::new();
    SELF.get_or_init(|| Regex::new(r"\bself\.").expect("valid self regex"))
}

#[derive(Debug, Clone, Default)]
pub struct PseudoPrinter;

impl PseudoPrinter {
    pub fn new() -> Self {
        Self
    }
}

impl PseudoRenderer for PseudoPrinter {
    fn render_pseudo(&self, module: &Module) -> String {
        let mut out = String::new();
        for (index, item) in module.items.iter().enumerate() {
            let spaced = !matches!(item, Item::Stmt(_));
            if index > 0 && (spaced || !matches!(module.items[index - 1], Item::Stmt(_))) {
                out.push('\n');
            }
            match item {
                Item::Process(process) => print_process(&mut out, process),
                Item::Function(function) => print_method(&mut out, function, 0),
                Item::Stmt(stmt) => print_stmt(&mut out, stmt, 0),
            }
        }
        out
    }
}

fn line(out: &mut String, text: &str, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}

fn print_process(out: &mut String, process: &Process) {
    let bases: Vec<&str> = process
        .bases
        .iter()
        .map(String::as_str)
        .filter(|b| *b != PROCESS_BASE_CLASS)
        .collect();
    if bases.is_empty() {
        line(out, &format!("process {}:", process.name), 0);
    } else {
        line(out, &format!("process {} extends {}:", process.name, bases.join(", ")), 0);
    }

    for member in &process.members {
        print_stmt(out, member, 1);
    }
    for method in &process.methods {
        print_method(out, method, 1);
    }
    if process.members.is_empty() && process.methods.is_empty() {
        line(out, "skip", 1);
    }
}

fn print_method(out: &mut String, method: &Method, depth: usize) {
    let args = method.args().join(", ");
    let heading = match method.kind() {
        MethodKind::Setup => format!("setup({}):", args),
        MethodKind::Main => "run:".to_string(),
        MethodKind::Handler { message } => format!("receive {}({}):", message, args),
        MethodKind::Plain => format!("function {}({}):", method.name, args),
    };
    line(out, &heading, depth);
    print_body(out, &method.body, depth + 1);
}

fn print_body(out: &mut String, body: &[Stmt], depth: usize) {
    if body.is_empty() {
        line(out, "skip", depth);
    }
    for stmt in body {
        print_stmt(out, stmt, depth);
    }
}

fn print_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    line(out, &rewrite(&stmt.text), depth);
    if !stmt.body.is_empty() {
        print_body(out, &stmt.body, depth + 1);
    }
}

/// Pseudocode form of one logical line
pub(crate) fn rewrite(text: &str) -> String {
    let text = self_access().replace_all(text.trim(), "");
    if text == "pass" {
        return "skip".to_string();
    }
    let text = rewrite_quantifiers(&text);
    match send_stmt().captures(&text) {
        Some(captures) => format!("send {} to {}", captures["msg"].trim(), captures["to"].trim()),
        None => text,
    }
}

fn rewrite_quantifiers(text: &str) -> String {
    rewrite_calls(text, &QUANTIFIERS, |call| {
        let mut parts = Vec::new();
        for arg in split_top_level(call.args) {
            let arg = rewrite_quantifiers(arg);
            match arg.split_once('=') {
                Some((key, condition)) if key.trim() == "has" && !condition.starts_with('=') => {
                    parts.push(format!("has {}", condition.trim()));
                }
                _ => parts.push(arg),
            }
        }
        format!("{} {}", call.name, parts.join(" "))
    })
}
