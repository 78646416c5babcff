//! `-i`: rewritten module plus incremental interface module
//!
//! Both files are staged in one transaction so that they appear together.

use super::output::{Artifact, ArtifactKind};
use super::{CompileOptions, PipelineError, Session, Toolchain};
use crate::config::constants::HOST_SUFFIX;
use crate::frontend::gate;
use crate::locator::CompilationUnit;
use crate::log_debug;
use crate::transform::TransformConfig;

pub(super) fn run(
    unit: &CompilationUnit,
    options: &CompileOptions,
    session: &Session,
    toolchain: &Toolchain,
) -> Result<Vec<Artifact>, PipelineError> {
    let config = TransformConfig::from_flags(options.transform);
    log_debug!("Transform configuration",
        "table1" => config.table1,
        "table2" => config.table2,
        "table3" => config.table3,
        "jb_style" => config.jb_style,
        "all_tables_disabled" => config.all_tables_disabled);

    let ast = super::parse(unit, session, toolchain)
        .and_then(|result| gate(unit, result))?;

    let modules = toolchain
        .incremental
        .generate(&ast, &config, session)
        .map_err(|source| PipelineError::IncrementalGeneration {
            path: unit.path.display().to_string(),
            source,
        })?;

    let primary = unit.output_or_default(options.output.as_deref(), HOST_SUFFIX);
    let interface = unit.interface_output();
    let primary_text = toolchain.renderer.render(&modules.rewritten);
    let interface_text = toolchain.renderer.render(&modules.interface);

    let mut transaction = session.writer().transaction();
    transaction.stage(&primary, &primary_text, ArtifactKind::Compiled)?;
    transaction.stage(&interface, &interface_text, ArtifactKind::Interface)?;
    Ok(transaction.commit()?)
}
