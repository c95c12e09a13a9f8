//! Writing staged artifacts to disk.
//!
//! Every unit is first written to a temporary file next to its final
//! location, and nothing is renamed into place until all of them were
//! written. A failure while staging therefore leaves earlier output
//! untouched. Renaming happens one unit at a time, so a failure at that
//! point can leave a mix of old and new files.
//!
//! Publishing only writes the units of the artifact. Files of levels that
//! were removed from the schema stay in a per-level directory.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::{
    config::OutputLayout,
    emit::Artifact,
    error::SemioError,
};

/// Publish `artifact` at `dest`.
///
/// For [`OutputLayout::Single`] `dest` is the output file. For
/// [`OutputLayout::PerLevel`] it is a directory, created when missing, that
/// receives `mod.rs` and one file per level.
///
/// # Errors
///
/// Returns [`SemioError::Io`] when a unit cannot be staged or moved into
/// place. Units already moved into place are not rolled back.
pub fn publish(artifact: &Artifact, dest: &Path) -> Result<(), SemioError> {
    info!(dest:? = dest, units = artifact.units().len(); "Publishing artifact");

    let targets: Vec<(PathBuf, &str)> = match artifact.layout() {
        OutputLayout::Single => {
            let [unit] = artifact.units() else {
                return Err(SemioError::Internal(format!(
                    "single-file layout staged {} units",
                    artifact.units().len()
                )));
            };
            if let Some(parent) = dest.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            vec![(dest.to_path_buf(), unit.contents())]
        }
        OutputLayout::PerLevel => {
            fs::create_dir_all(dest)?;
            artifact
                .units()
                .iter()
                .map(|unit| (dest.join(unit.file_name()), unit.contents()))
                .collect()
        }
    };

    let mut staged = Vec::with_capacity(targets.len());
    for (path, contents) in targets {
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        debug!(path:? = path; "Unit staged");
        staged.push((file, path));
    }

    for (file, path) in staged {
        file.persist(&path).map_err(|err| SemioError::Io(err.error))?;
        debug!(path:? = path; "Unit published");
    }

    Ok(())
}
