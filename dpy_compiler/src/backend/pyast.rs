//! Host-language (Python) syntax tree emitted by the generators
//!
//! Expressions are carried as source text; only the statement structure the
//! printer needs for indentation is modelled.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PyStmt {
    /// `import module` or `import module as alias`
    Import {
        module: String,
        alias: Option<String>,
    },
    /// `from module import a, b` (`*` when `names` is empty)
    ImportFrom { module: String, names: Vec<String> },
    ClassDef {
        name: String,
        bases: Vec<String>,
        body: Vec<PyStmt>,
    },
    FunctionDef {
        name: String,
        params: Vec<String>,
        body: Vec<PyStmt>,
    },
    /// Compound statement with a header line such as `if x:`
    Block { header: String, body: Vec<PyStmt> },
    Assign { target: String, value: String },
    Global(Vec<String>),
    Return(Option<String>),
    /// A simple statement emitted verbatim
    Expr(String),
    Comment(String),
    Pass,
}

impl PyStmt {
    pub fn expr(text: impl Into<String>) -> Self {
        PyStmt::Expr(text.into())
    }

    pub fn assign(target: impl Into<String>, value: impl Into<String>) -> Self {
        PyStmt::Assign {
            target: target.into(),
            value: value.into(),
        }
    }

    pub fn function(name: impl Into<String>, params: Vec<String>, body: Vec<PyStmt>) -> Self {
        PyStmt::FunctionDef {
            name: name.into(),
            params,
            body,
        }
    }

    /// True for definitions the printer separates with blank lines
    pub fn is_definition(&self) -> bool {
        matches!(self, PyStmt::ClassDef { .. } | PyStmt::FunctionDef { .. })
    }
}

/// A generated host module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyModule {
    pub docstring: Option<String>,
    pub body: Vec<PyStmt>,
}

impl PyModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    pub fn push(&mut self, stmt: PyStmt) {
        self.body.push(stmt);
    }

    pub fn function(&self, name: &str) -> Option<&PyStmt> {
        self.body
            .iter()
            .find(|s| matches!(s, PyStmt::FunctionDef { name: n, .. } if n == name))
    }

    pub fn class(&self, name: &str) -> Option<&PyStmt> {
        self.body
            .iter()
            .find(|s| matches!(s, PyStmt::ClassDef { name: n, .. } if n == name))
    }
}
