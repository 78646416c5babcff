//! Incremental-interface generation
//!
//! Queries found in process methods are hoisted into a separate interface
//! module (`<module>_inc`) and their occurrences rewritten to call into it.
//! The interface also carries one hook per process setup and per message
//! handler, which the rewritten program invokes so that an incrementalizer
//! can maintain query results instead of recomputing them.
//!
//! In `jb_style` each query becomes a module-level variable `QUERY_N` with an
//! `update_QUERY_N` function, and the hooks refresh the variables of their
//! process.

use super::pygen::{convert_process_with, convert_stmt, convert_method, runtime_import};
use super::pyast::{PyModule, PyStmt};
use super::query::find_calls;
use super::{GenerateError, IncrementalGenerator, IncrementalModules};
use crate::config::constants::interface_module_name;
use crate::frontend::ast::{Item, Method, MethodKind, Module, Process, Stmt};
use crate::log_debug;
use crate::pipeline::Session;
use crate::transform::{QueryTable, TransformConfig};

/// Alias the rewritten module imports the interface under
pub const INTERFACE_ALIAS: &str = "_inc";

const QUERY_FUNCTIONS: [&str; 4] = ["some", "each", "setof", "len"];

#[derive(Debug, Clone, Default)]
pub struct IncrementalTransformer;

impl IncrementalTransformer {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Query {
    id: usize,
    table: QueryTable,
    process: String,
    text: String,
}

fn query_function(id: usize) -> String {
    format!("query_{}", id)
}

fn query_variable(id: usize) -> String {
    format!("QUERY_{}", id)
}

fn update_function(id: usize) -> String {
    format!("update_QUERY_{}", id)
}

fn hook_name(process: &str, event: &str) -> String {
    format!("on_{}_{}", process, event)
}

/// Collects queries while rewriting statement text
struct Hoister<'c> {
    config: &'c TransformConfig,
    functions: Vec<&'static str>,
    queries: Vec<Query>,
}

impl<'c> Hoister<'c> {
    fn new(config: &'c TransformConfig) -> Self {
        let functions = QUERY_FUNCTIONS
            .into_iter()
            .filter(|name| QueryTable::for_function(name).is_some_and(|t| config.is_enabled(t)))
            .collect();
        Self {
            config,
            functions,
            queries: Vec::new(),
        }
    }

    fn reference(&self, id: usize) -> String {
        if self.config.jb_style {
            format!("{}.{}", INTERFACE_ALIAS, query_variable(id))
        } else {
            format!("{}.{}(self)", INTERFACE_ALIAS, query_function(id))
        }
    }

    /// Id of the query, reusing an identical one from the same process
    fn intern(&mut self, process: &str, table: QueryTable, text: &str) -> usize {
        if let Some(existing) = self
            .queries
            .iter()
            .find(|q| q.process == process && q.text == text)
        {
            return existing.id;
        }
        let id = self.queries.len() + 1;
        self.queries.push(Query {
            id,
            table,
            process: process.to_string(),
            text: text.to_string(),
        });
        id
    }

    fn rewrite_text(&mut self, process: &str, method: &str, text: &str) -> Result<String, GenerateError> {
        if self.functions.is_empty() {
            return Ok(text.to_string());
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for call in find_calls(text, &self.functions) {
            let table = QueryTable::for_function(call.name).ok_or_else(|| GenerateError::Failed {
                message: format!("'{}' is not a query function", call.name),
            })?;
            if call.args.trim().is_empty() {
                return Err(GenerateError::Failed {
                    message: format!("empty {} query in {}.{}", call.name, process, method),
                });
            }
            let id = self.intern(process, table, call.text(text));
            out.push_str(&text[last..call.start]);
            out.push_str(&self.reference(id));
            last = call.end;
        }
        out.push_str(&text[last..]);
        Ok(out)
    }

    fn rewrite_stmt(&mut self, process: &str, method: &str, stmt: &Stmt) -> Result<Stmt, GenerateError> {
        let body = stmt
            .body
            .iter()
            .map(|child| self.rewrite_stmt(process, method, child))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Stmt {
            text: self.rewrite_text(process, method, &stmt.text)?,
            span: stmt.span,
            body,
        })
    }

    fn rewrite_process(&mut self, process: &Process) -> Result<Process, GenerateError> {
        let mut rewritten = process.clone();
        for method in &mut rewritten.methods {
            let name = method.name.clone();
            method.body = method
                .body
                .iter()
                .map(|stmt| self.rewrite_stmt(&process.name, &name, stmt))
                .collect::<Result<Vec<_>, _>>()?;
        }
        Ok(rewritten)
    }

    fn process_queries<'q>(&'q self, process: &'q str) -> impl Iterator<Item = &'q Query> + 'q {
        self.queries.iter().filter(move |q| q.process == process)
    }
}

/// Host method with the interface hook call spliced in
fn hooked_method(process: &str, method: &Method) -> PyStmt {
    let mut lowered = convert_method(method);
    let PyStmt::FunctionDef { body, .. } = &mut lowered else {
        return lowered;
    };

    match method.kind() {
        MethodKind::Setup => {
            body.push(PyStmt::expr(format!(
                "{}.{}(self)",
                INTERFACE_ALIAS,
                hook_name(process, "setup")
            )));
        }
        MethodKind::Handler { message } => {
            let mut args = vec!["self".to_string()];
            args.extend(method.args().iter().cloned());
            body.insert(
                0,
                PyStmt::expr(format!(
                    "{}.{}({})",
                    INTERFACE_ALIAS,
                    hook_name(process, &message),
                    args.join(", ")
                )),
            );
        }
        MethodKind::Main | MethodKind::Plain => {}
    }
    lowered
}

fn hook_body(hoister: &Hoister<'_>, process: &str) -> Vec<PyStmt> {
    if !hoister.config.jb_style {
        return vec![PyStmt::Pass];
    }
    let updates: Vec<PyStmt> = hoister
        .process_queries(process)
        .map(|q| PyStmt::expr(format!("{}(self)", update_function(q.id))))
        .collect();
    if updates.is_empty() {
        vec![PyStmt::Pass]
    } else {
        updates
    }
}

fn interface_module(module: &Module, hoister: &Hoister<'_>) -> PyModule {
    let mut interface =
        PyModule::new().with_docstring(format!("Incremental interface for {}.", module.name));
    interface.push(runtime_import());

    if hoister.config.jb_style {
        for query in &hoister.queries {
            interface.push(PyStmt::assign(query_variable(query.id), "None"));
        }
    }

    for query in &hoister.queries {
        let comment = PyStmt::Comment(format!("{}: {}", query.table, query.process));
        let body = if hoister.config.jb_style {
            vec![
                comment,
                PyStmt::Global(vec![query_variable(query.id)]),
                PyStmt::assign(query_variable(query.id), query.text.clone()),
            ]
        } else {
            vec![comment, PyStmt::Return(Some(query.text.clone()))]
        };
        let name = if hoister.config.jb_style {
            update_function(query.id)
        } else {
            query_function(query.id)
        };
        interface.push(PyStmt::function(name, vec!["self".to_string()], body));
    }

    for process in module.processes() {
        if process.setup().is_some() {
            interface.push(PyStmt::function(
                hook_name(&process.name, "setup"),
                vec!["self".to_string()],
                hook_body(hoister, &process.name),
            ));
        }
        for handler in process.handlers() {
            let MethodKind::Handler { message } = handler.kind() else {
                continue;
            };
            let mut params = vec!["self".to_string()];
            params.extend(handler.args().iter().cloned());
            interface.push(PyStmt::function(
                hook_name(&process.name, &message),
                params,
                hook_body(hoister, &process.name),
            ));
        }
    }

    interface
}

impl IncrementalGenerator for IncrementalTransformer {
    fn generate(
        &self,
        module: &Module,
        config: &TransformConfig,
        session: &Session,
    ) -> Result<IncrementalModules, GenerateError> {
        let mut hoister = Hoister::new(config);
        let mut rewritten =
            PyModule::new().with_docstring(format!("Generated from {}.", module.name));
        rewritten.push(runtime_import());
        rewritten.push(PyStmt::Import {
            module: interface_module_name(&module.name),
            alias: Some(INTERFACE_ALIAS.to_string()),
        });

        for item in &module.items {
            let stmt = match item {
                Item::Process(process) => {
                    let process = hoister.rewrite_process(process)?;
                    convert_process_with(&process, |method| hooked_method(&process.name, method))?
                }
                Item::Function(function) => convert_method(function),
                Item::Stmt(stmt) => convert_stmt(stmt),
            };
            rewritten.push(stmt);
        }

        if session.debug_level.is_debug() {
            for query in &hoister.queries {
                log_debug!("Hoisted query",
                    "id" => query.id,
                    "table" => query.table,
                    "process" => query.process,
                    "query" => query.text);
            }
        }
        log_debug!("Incremental interface generated",
            "module" => module.name,
            "queries" => hoister.queries.len(),
            "jb_style" => config.jb_style);

        Ok(IncrementalModules {
            interface: interface_module(module, &hoister),
            rewritten,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Renderer, SourcePrinter};
    use crate::transform::TransformFlags;
    use assert_matches::assert_matches;

    fn method(name: &str, params: &[&str], body: Vec<Stmt>) -> Method {
        Method {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            span: None,
            body,
        }
    }

    fn election() -> Module {
        Module {
            name: "ring".to_string(),
            items: vec![Item::Process(Process {
                name: "P".to_string(),
                bases: vec!["DistProcess".to_string()],
                span: None,
                methods: vec![
                    method("setup", &["self", "ps"], vec![Stmt::new("self.ps = ps")]),
                    method(
                        "main",
                        &["self"],
                        vec![
                            Stmt::new("await(some(p in self.ps, has=p.done))"),
                            Stmt::new("if each(q in self.ps, has=q.ok):")
                                .with_body(vec![Stmt::new("print(len(self.ps))")]),
                        ],
                    ),
                    method(
                        "OnPing",
                        &["self", "n"],
                        vec![Stmt::new("if some(p in self.ps, has=p.done):")
                            .with_body(vec![Stmt::new("pass")])],
                    ),
                ],
                members: vec![],
            })],
        }
    }

    fn generate(flags: TransformFlags) -> IncrementalModules {
        IncrementalTransformer::new()
            .generate(&election(), &TransformConfig::from_flags(flags), &Session::default())
            .unwrap()
    }

    fn render(module: &PyModule) -> String {
        SourcePrinter::new().render(module)
    }

    #[test]
    fn test_queries_are_hoisted() {
        let modules = generate(TransformFlags::default());
        let interface = render(&modules.interface);
        let rewritten = render(&modules.rewritten);

        assert!(interface.contains("def query_1(self):\n    # table1: P\n    return some(p in self.ps, has=p.done)\n"));
        assert!(interface.contains("def query_2(self):"));
        assert!(interface.contains("return len(self.ps)"));
        assert!(modules.interface.function("query_4").is_none());

        assert!(rewritten.contains("import ring_inc as _inc\n"));
        assert!(rewritten.contains("await(_inc.query_1(self))"));
        assert!(rewritten.contains("if _inc.query_2(self):"));
        assert!(rewritten.contains("print(_inc.query_3(self))"));
        // identical query in the handler reuses query_1
        assert!(rewritten.contains("if _inc.query_1(self):"));
    }

    #[test]
    fn test_hooks_are_emitted_and_called() {
        let modules = generate(TransformFlags::default());
        assert!(modules.interface.function("on_P_setup").is_some());
        assert!(modules.interface.function("on_P_Ping").is_some());

        let rewritten = render(&modules.rewritten);
        assert!(rewritten.contains("        self.ps = ps\n        _inc.on_P_setup(self)\n"));
        assert!(rewritten.contains("    def OnPing(self, n):\n        _inc.on_P_Ping(self, n)\n"));
    }

    #[test]
    fn test_disabled_table_is_left_in_place() {
        let modules = generate(TransformFlags {
            no_table2: true,
            ..TransformFlags::default()
        });
        let rewritten = render(&modules.rewritten);
        assert!(rewritten.contains("if each(q in self.ps, has=q.ok):"));
        assert!(rewritten.contains("print(_inc.query_2(self))"));
    }

    #[test]
    fn test_all_tables_disabled_still_builds_both_modules() {
        let modules = generate(TransformFlags {
            no_all_tables: true,
            ..TransformFlags::default()
        });
        assert!(modules.interface.function("query_1").is_none());
        assert!(modules.interface.function("on_P_setup").is_some());
        let rewritten = render(&modules.rewritten);
        assert!(rewritten.contains("await(some(p in self.ps, has=p.done))"));
        assert!(rewritten.contains("import ring_inc as _inc"));
    }

    #[test]
    fn test_jb_style_uses_maintained_variables() {
        let modules = generate(TransformFlags {
            jb_style: true,
            ..TransformFlags::default()
        });
        let interface = render(&modules.interface);
        let rewritten = render(&modules.rewritten);

        assert!(interface.contains("QUERY_1 = None\n"));
        assert!(interface.contains(
            "def update_QUERY_1(self):\n    # table1: P\n    global QUERY_1\n    QUERY_1 = some(p in self.ps, has=p.done)\n"
        ));
        assert!(interface.contains(
            "def on_P_Ping(self, n):\n    update_QUERY_1(self)\n    update_QUERY_2(self)\n    update_QUERY_3(self)\n"
        ));
        assert!(rewritten.contains("await(_inc.QUERY_1)"));
        assert!(modules.interface.function("query_1").is_none());
    }

    #[test]
    fn test_missing_main() {
        let mut module = election();
        if let Item::Process(process) = &mut module.items[0] {
            process.methods.retain(|m| m.name != "main");
        }
        let result = IncrementalTransformer::new().generate(
            &module,
            &TransformConfig::default(),
            &Session::default(),
        );
        assert_matches!(result, Err(GenerateError::MissingMain { .. }));
    }

    #[test]
    fn test_empty_query_fails() {
        let module = Module {
            name: "m".to_string(),
            items: vec![Item::Process(Process {
                name: "P".to_string(),
                bases: vec!["DistProcess".to_string()],
                span: None,
                methods: vec![method("main", &["self"], vec![Stmt::new("x = setof()")])],
                members: vec![],
            })],
        };
        let result = IncrementalTransformer::new().generate(
            &module,
            &TransformConfig::default(),
            &Session::default(),
        );
        assert_matches!(result, Err(GenerateError::Failed { ref message }) if message.contains("P.main"));
    }
}
