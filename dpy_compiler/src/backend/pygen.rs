//! Structural DistPy to Python generator
//!
//! Statement text passes through unchanged; the generator adds the runtime
//! import and the per-process message dispatch table.

use super::pyast::{PyModule, PyStmt};
use super::{GenerateError, Generator};
use crate::frontend::ast::{Item, Method, MethodKind, Module, Process, Stmt};
use crate::log_debug;
use crate::pipeline::Session;

pub const RUNTIME_MODULE: &str = "dpy.runtime";
pub const HANDLER_TABLE: &str = "_handlers";

#[derive(Debug, Clone, Default)]
pub struct PythonGenerator;

impl PythonGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for PythonGenerator {
    fn generate(&self, module: &Module, session: &Session) -> Result<PyModule, GenerateError> {
        let mut output = PyModule::new().with_docstring(format!("Generated from {}.", module.name));
        output.push(runtime_import());

        for item in &module.items {
            let stmt = match item {
                Item::Process(process) => convert_process(process)?,
                Item::Function(function) => convert_method(function),
                Item::Stmt(stmt) => convert_stmt(stmt),
            };
            output.push(stmt);
        }

        if session.debug_level.is_debug() {
            log_debug!("Generated host module",
                "module" => module.name,
                "statements" => output.body.len());
        }

        Ok(output)
    }
}

pub(crate) fn runtime_import() -> PyStmt {
    PyStmt::ImportFrom {
        module: RUNTIME_MODULE.to_string(),
        names: Vec::new(),
    }
}

/// Dispatch table literal mapping message names to handler method names
pub(crate) fn handler_table(process: &Process) -> String {
    let entries: Vec<String> = process
        .methods
        .iter()
        .filter_map(|m| match m.kind() {
            MethodKind::Handler { message } => Some(format!("'{}': '{}'", message, m.name)),
            _ => None,
        })
        .collect();
    format!("{{{}}}", entries.join(", "))
}

pub(crate) fn convert_process(process: &Process) -> Result<PyStmt, GenerateError> {
    convert_process_with(process, convert_method)
}

/// Shared process lowering; `lower` converts each method
pub(crate) fn convert_process_with<F>(process: &Process, mut lower: F) -> Result<PyStmt, GenerateError>
where
    F: FnMut(&Method) -> PyStmt,
{
    if process.main().is_none() {
        return Err(GenerateError::MissingMain {
            process: process.name.clone(),
        });
    }

    let mut body = vec![PyStmt::assign(HANDLER_TABLE, handler_table(process))];
    body.extend(process.members.iter().map(convert_stmt));
    body.extend(process.methods.iter().map(&mut lower));

    Ok(PyStmt::ClassDef {
        name: process.name.clone(),
        bases: process.bases.clone(),
        body,
    })
}

pub(crate) fn convert_method(method: &Method) -> PyStmt {
    PyStmt::function(
        method.name.clone(),
        method.params.clone(),
        convert_body(&method.body),
    )
}

pub(crate) fn convert_body(body: &[Stmt]) -> Vec<PyStmt> {
    if body.is_empty() {
        return vec![PyStmt::Pass];
    }
    body.iter().map(convert_stmt).collect()
}

pub(crate) fn convert_stmt(stmt: &Stmt) -> PyStmt {
    if stmt.body.is_empty() && !stmt.opens_block() {
        return match stmt.text.trim() {
            "pass" => PyStmt::Pass,
            text => PyStmt::expr(text),
        };
    }
    PyStmt::Block {
        header: stmt.text.clone(),
        body: convert_body(&stmt.body),
    }
}
