//! Persisted model artifacts.
//!
//! A run writes two files named by its reference date: the fitted vectorizer
//! (`dv-<date>.bin`) and the fitted regression (`model-<date>.bin`). Both are
//! bincode-encoded serde values.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while writing or reading artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Output directory does not exist.
    #[error("Model directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    /// Encoding or decoding error.
    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// IO error.
    #[error("IO error for {path}: {source}")]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// File locations of one artifact pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Vectorizer file
    pub vectorizer: PathBuf,
    /// Regression model file
    pub model: PathBuf,
}

impl ArtifactPaths {
    /// Paths for a reference date inside `models_dir`.
    pub fn for_date(models_dir: impl AsRef<Path>, date: &str) -> Self {
        let dir = models_dir.as_ref();
        Self {
            vectorizer: dir.join(format!("dv-{}.bin", date)),
            model: dir.join(format!("model-{}.bin", date)),
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ArtifactError + '_ {
    move |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Temporary sibling a file is staged in before it is renamed into place.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "failed to remove staged artifact");
    }
}

/// Stage every file, then rename them all into place.
///
/// On failure, staged files are removed along with any file already renamed,
/// so either every target is written or none is.
fn write_all_or_nothing(files: &[(&Path, &[u8])]) -> Result<(), ArtifactError> {
    let staged: Vec<PathBuf> = files.iter().map(|(path, _)| partial_path(path)).collect();

    for (partial, (_, bytes)) in staged.iter().zip(files) {
        if let Err(e) = std::fs::write(partial, bytes).map_err(io_error(partial)) {
            staged.iter().for_each(|p| remove_quietly(p));
            return Err(e);
        }
    }

    for (i, (partial, (path, _))) in staged.iter().zip(files).enumerate() {
        if let Err(e) = std::fs::rename(partial, path).map_err(io_error(path)) {
            staged[i..].iter().for_each(|p| remove_quietly(p));
            files[..i].iter().for_each(|(p, _)| remove_quietly(p));
            return Err(e);
        }
    }

    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    std::fs::read(path).map_err(io_error(path))
}

/// Write the vectorizer and model.
///
/// Both values are encoded before either file is written, and the target
/// directory must already exist. Either both files are written or neither is.
pub fn save_artifacts<V, M>(
    paths: &ArtifactPaths,
    vectorizer: &V,
    model: &M,
) -> Result<(), ArtifactError>
where
    V: Serialize,
    M: Serialize,
{
    for path in [&paths.vectorizer, &paths.model] {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
            && !dir.is_dir()
        {
            return Err(ArtifactError::MissingDirectory(dir.to_path_buf()));
        }
    }

    let vectorizer_bytes = bincode::serialize(vectorizer)?;
    let model_bytes = bincode::serialize(model)?;

    write_all_or_nothing(&[
        (paths.vectorizer.as_path(), vectorizer_bytes.as_slice()),
        (paths.model.as_path(), model_bytes.as_slice()),
    ])?;

    info!(
        vectorizer = %paths.vectorizer.display(),
        model = %paths.model.display(),
        "saved model artifacts"
    );
    Ok(())
}

/// Read a vectorizer and model written by [`save_artifacts`].
pub fn load_artifacts<V, M>(paths: &ArtifactPaths) -> Result<(V, M), ArtifactError>
where
    V: DeserializeOwned,
    M: DeserializeOwned,
{
    let vectorizer = bincode::deserialize(&read_file(&paths.vectorizer)?)?;
    let model = bincode::deserialize(&read_file(&paths.model)?)?;
    Ok((vectorizer, model))
}
