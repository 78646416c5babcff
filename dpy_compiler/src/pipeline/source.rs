//! Default mode: DistPy source to a Python module

use super::output::{Artifact, ArtifactKind};
use super::{CompileOptions, PipelineError, Session, Toolchain};
use crate::config::constants::HOST_SUFFIX;
use crate::frontend::gate;
use crate::locator::CompilationUnit;

pub(super) fn run(
    unit: &CompilationUnit,
    options: &CompileOptions,
    session: &Session,
    toolchain: &Toolchain,
) -> Result<Vec<Artifact>, PipelineError> {
    let ast = super::parse(unit, session, toolchain)
        .and_then(|result| gate(unit, result))?;

    let host = toolchain
        .generator
        .generate(&ast, session)
        .map_err(|source| PipelineError::HostGeneration {
            path: unit.path.display().to_string(),
            source,
        })?;

    let text = toolchain.renderer.render(&host);
    let target = unit.output_or_default(options.output.as_deref(), HOST_SUFFIX);
    let artifact = session.writer().write(&target, &text, ArtifactKind::Compiled)?;
    Ok(vec![artifact])
}
