//! `-p`: DistPy source to pseudocode

use super::output::{Artifact, ArtifactKind};
use super::{CompileOptions, PipelineError, Session, Toolchain};
use crate::config::constants::PSEUDO_SUFFIX;
use crate::frontend::gate;
use crate::locator::CompilationUnit;

/// `-o` is not consulted here; only `--psdfile` overrides the target
pub(super) fn run(
    unit: &CompilationUnit,
    options: &CompileOptions,
    session: &Session,
    toolchain: &Toolchain,
) -> Result<Vec<Artifact>, PipelineError> {
    let ast = super::parse(unit, session, toolchain)
        .and_then(|result| gate(unit, result))?;

    let text = toolchain.pseudo.render_pseudo(&ast);
    let target = unit.output_or_default(options.pseudo_output.as_deref(), PSEUDO_SUFFIX);
    let artifact = session.writer().write(&target, &text, ArtifactKind::PseudoCode)?;
    Ok(vec![artifact])
}
