//! Artifact output
//!
//! `OutputWriter` writes one artifact; `WriteTransaction` stages several into
//! hidden temp siblings and renames them into place together, so a unit never
//! ends up with only part of its artifact set.

use crate::config::runtime::OutputPreferences;
use crate::logging::{codes, Code};
use crate::{log_debug, log_success};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Compiled,
    PseudoCode,
    Interface,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ArtifactKind::Compiled => "compiled",
            ArtifactKind::PseudoCode => "pseudo code",
            ArtifactKind::Interface => "interface",
        };
        f.write_str(label)
    }
}

/// A file produced for the unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutputError {
    #[error("Could not write {kind} file {path}: {message}")]
    Write {
        path: String,
        kind: ArtifactKind,
        message: String,
    },

    #[error("Could not commit {kind} file {path}: {message}")]
    Commit {
        path: String,
        kind: ArtifactKind,
        message: String,
    },
}

impl OutputError {
    pub fn error_code(&self) -> Code {
        match self {
            OutputError::Write { .. } => codes::output::WRITE_FAILED,
            OutputError::Commit { .. } => codes::output::COMMIT_FAILED,
        }
    }

    fn write(path: &Path, kind: ArtifactKind, error: io::Error) -> Self {
        OutputError::Write {
            path: path.display().to_string(),
            kind,
            message: error.to_string(),
        }
    }
}

fn write_file(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    {
        let mut writer = BufWriter::new(&mut file);
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }
    file.sync_all()
}

/// Hidden sibling `.{name}.{tag}.{nanos}` of `path`
fn sibling_path(path: &Path, tag: &str) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    parent.join(format!(".{}.{}.{}", name, tag, timestamp))
}

/// Keep a copy of an existing target so a failed commit can put it back
fn back_up(target: &Path) -> io::Result<Option<PathBuf>> {
    if !target.is_file() {
        return Ok(None);
    }
    let backup = sibling_path(target, "bak");
    fs::hard_link(target, &backup).or_else(|_| fs::copy(target, &backup).map(|_| ()))?;
    Ok(Some(backup))
}

/// Undo a committed rename: the old file returns, or the new one goes
fn restore(target: &Path, backup: Option<&Path>) {
    match backup {
        Some(backup) => {
            let _ = fs::rename(backup, target);
        }
        None => {
            let _ = fs::remove_file(target);
        }
    }
}

fn report(artifact: &Artifact) {
    log_success!(
        codes::success::ARTIFACT_WRITTEN,
        &format!("Written {} file {}.", artifact.kind, artifact.path.display()),
        "bytes" => artifact.bytes
    );
}

/// Writes artifacts and reports each one on the operator channel
#[derive(Debug, Clone)]
pub struct OutputWriter {
    atomic: bool,
}

impl OutputWriter {
    pub fn new(atomic: bool) -> Self {
        Self { atomic }
    }

    pub fn from_preferences(preferences: &OutputPreferences) -> Self {
        Self::new(preferences.atomic_writes)
    }

    pub fn write(
        &self,
        path: &Path,
        contents: &str,
        kind: ArtifactKind,
    ) -> Result<Artifact, OutputError> {
        if self.atomic {
            let mut transaction = self.transaction();
            transaction.stage(path, contents, kind)?;
            let mut artifacts = transaction.commit()?;
            return artifacts.pop().ok_or_else(|| OutputError::Commit {
                path: path.display().to_string(),
                kind,
                message: "nothing was committed".to_string(),
            });
        }

        write_file(path, contents).map_err(|e| OutputError::write(path, kind, e))?;
        let artifact = Artifact {
            path: path.to_path_buf(),
            kind,
            bytes: contents.len(),
        };
        report(&artifact);
        Ok(artifact)
    }

    pub fn transaction(&self) -> WriteTransaction {
        WriteTransaction::default()
    }
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::new(true)
    }
}

#[derive(Debug)]
struct StagedFile {
    temp: PathBuf,
    target: PathBuf,
    kind: ArtifactKind,
    bytes: usize,
}

/// A set of artifacts that become visible together or not at all
#[derive(Debug, Default)]
pub struct WriteTransaction {
    staged: Vec<StagedFile>,
}

impl WriteTransaction {
    /// Write `contents` into a hidden sibling of `path`
    pub fn stage(&mut self, path: &Path, contents: &str, kind: ArtifactKind) -> Result<(), OutputError> {
        let temp = sibling_path(path, "tmp");
        if let Err(error) = write_file(&temp, contents) {
            let _ = fs::remove_file(&temp);
            return Err(OutputError::write(path, kind, error));
        }

        log_debug!("Staged artifact",
            "target" => path.display(),
            "temp" => temp.display());

        self.staged.push(StagedFile {
            temp,
            target: path.to_path_buf(),
            kind,
            bytes: contents.len(),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Rename every staged file into place.
    ///
    /// Existing targets are backed up first. If any step fails, targets
    /// already committed by this transaction get their previous contents
    /// back (or are removed when they did not exist) and the remaining temp
    /// files are deleted.
    pub fn commit(mut self) -> Result<Vec<Artifact>, OutputError> {
        let staged = std::mem::take(&mut self.staged);
        let mut committed: Vec<(Artifact, Option<PathBuf>)> = Vec::with_capacity(staged.len());

        for (index, file) in staged.iter().enumerate() {
            let outcome = back_up(&file.target).and_then(|backup| {
                match fs::rename(&file.temp, &file.target) {
                    Ok(()) => Ok(backup),
                    Err(error) => {
                        if let Some(backup) = &backup {
                            let _ = fs::remove_file(backup);
                        }
                        Err(error)
                    }
                }
            });

            match outcome {
                Ok(backup) => committed.push((
                    Artifact {
                        path: file.target.clone(),
                        kind: file.kind,
                        bytes: file.bytes,
                    },
                    backup,
                )),
                Err(error) => {
                    for (artifact, backup) in committed.iter().rev() {
                        restore(&artifact.path, backup.as_deref());
                    }
                    for pending in &staged[index..] {
                        let _ = fs::remove_file(&pending.temp);
                    }
                    return Err(OutputError::Commit {
                        path: file.target.display().to_string(),
                        kind: file.kind,
                        message: error.to_string(),
                    });
                }
            }
        }

        let artifacts: Vec<Artifact> = committed
            .into_iter()
            .map(|(artifact, backup)| {
                if let Some(backup) = backup {
                    let _ = fs::remove_file(backup);
                }
                artifact
            })
            .collect();
        artifacts.iter().for_each(report);
        Ok(artifacts)
    }
}

impl Drop for WriteTransaction {
    fn drop(&mut self) {
        for file in &self.staged {
            let _ = fs::remove_file(&file.temp);
        }
    }
}
