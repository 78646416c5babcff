//! DistPy AST produced by the structural parser
//!
//! The tree is block-structured: every logical line is a `Stmt` that owns the
//! indented block following it. Process declarations and their methods are
//! lifted out of the statement tree so generators can address them directly.

use crate::config::constants::HANDLER_PREFIX;
use crate::utils::Span;
use serde::{Deserialize, Serialize};

pub type Identifier = String;

/// One logical source line and the block nested under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stmt {
    /// Logical line text with leading indentation removed
    pub text: String,
    pub span: Option<Span>,
    pub body: Vec<Stmt>,
}

impl Stmt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            span: None,
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: Vec<Stmt>) -> Self {
        self.body = body;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// True when the line opens a block (`if ...:`, `def ...:`)
    pub fn opens_block(&self) -> bool {
        self.text.trim_end().ends_with(':')
    }

    /// Depth-first visit of this statement and every nested one
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Stmt)) {
        visit(self);
        for child in &self.body {
            child.walk(visit);
        }
    }
}

/// How a method participates in the process lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    Setup,
    Main,
    /// Message handler for the named message (`OnPing` handles `Ping`)
    Handler { message: Identifier },
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: Identifier,
    pub params: Vec<Identifier>,
    pub span: Option<Span>,
    pub body: Vec<Stmt>,
}

impl Method {
    pub fn kind(&self) -> MethodKind {
        match self.name.as_str() {
            "setup" => MethodKind::Setup,
            "main" => MethodKind::Main,
            name => match name.strip_prefix(HANDLER_PREFIX) {
                Some(message)
                    if message.starts_with(|c: char| c.is_ascii_uppercase()) =>
                {
                    MethodKind::Handler {
                        message: message.to_string(),
                    }
                }
                _ => MethodKind::Plain,
            },
        }
    }

    /// Parameters without the leading `self`
    pub fn args(&self) -> &[Identifier] {
        match self.params.first() {
            Some(first) if first == "self" => &self.params[1..],
            _ => &self.params,
        }
    }
}

/// A `class Name(DistProcess):` declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub name: Identifier,
    pub bases: Vec<Identifier>,
    pub span: Option<Span>,
    pub methods: Vec<Method>,
    /// Class-level statements that are not method definitions
    pub members: Vec<Stmt>,
}

impl Process {
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn setup(&self) -> Option<&Method> {
        self.method("setup")
    }

    pub fn main(&self) -> Option<&Method> {
        self.method("main")
    }

    pub fn handlers(&self) -> impl Iterator<Item = &Method> {
        self.methods
            .iter()
            .filter(|m| matches!(m.kind(), MethodKind::Handler { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    Process(Process),
    /// Top-level `def`
    Function(Method),
    Stmt(Stmt),
}

/// Root of a parsed compilation unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: Identifier,
    pub items: Vec<Item>,
}

impl Module {
    pub fn new(name: impl Into<Identifier>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.items.iter().filter_map(|item| match item {
            Item::Process(p) => Some(p),
            _ => None,
        })
    }

    pub fn process(&self, name: &str) -> Option<&Process> {
        self.processes().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str, params: &[&str]) -> Method {
        Method {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            span: None,
            body: vec![Stmt::new("pass")],
        }
    }

    #[test]
    fn test_method_kinds() {
        assert_eq!(method("setup", &["self"]).kind(), MethodKind::Setup);
        assert_eq!(method("main", &["self"]).kind(), MethodKind::Main);
        assert_eq!(
            method("OnPing", &["self", "n"]).kind(),
            MethodKind::Handler {
                message: "Ping".to_string()
            }
        );
        assert_eq!(method("Once", &["self"]).kind(), MethodKind::Plain);
        assert_eq!(method("helper", &[]).kind(), MethodKind::Plain);
    }

    #[test]
    fn test_args_skip_self() {
        assert_eq!(method("OnPing", &["self", "n", "p"]).args(), ["n", "p"]);
        assert_eq!(method("helper", &["x"]).args(), ["x"]);
    }

    #[test]
    fn test_process_lookup() {
        let process = Process {
            name: "P".to_string(),
            bases: vec!["DistProcess".to_string()],
            span: None,
            methods: vec![
                method("setup", &["self"]),
                method("main", &["self"]),
                method("OnPing", &["self"]),
            ],
            members: vec![],
        };
        assert!(process.setup().is_some());
        assert!(process.main().is_some());
        assert_eq!(process.handlers().count(), 1);

        let module = Module {
            name: "ring".to_string(),
            items: vec![Item::Process(process)],
        };
        assert!(module.process("P").is_some());
        assert!(module.process("Q").is_none());
    }

    #[test]
    fn test_walk_visits_nested() {
        let stmt = Stmt::new("if x:").with_body(vec![
            Stmt::new("for y in z:").with_body(vec![Stmt::new("send(y)")]),
        ]);
        let mut seen = Vec::new();
        stmt.walk(&mut |s| seen.push(s.text.clone()));
        assert_eq!(seen, vec!["if x:", "for y in z:", "send(y)"]);
        assert!(stmt.opens_block());
    }
}
