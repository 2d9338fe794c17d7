use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::codec::{self, ManifestFormat};
use crate::models::{CoreError, CoreErrorKind, CoreResult, Manifest};

pub const DEFAULT_MANIFEST_PATH: &str = ".replit";

pub trait ManifestSource: Send + Sync {
    fn origin(&self) -> Option<&Path>;

    fn read(&self) -> CoreResult<String>;
}

pub struct FsManifestSource {
    path: PathBuf,
}

impl FsManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ManifestFormat {
        ManifestFormat::from_path(&self.path)
    }
}

impl ManifestSource for FsManifestSource {
    fn origin(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn read(&self) -> CoreResult<String> {
        std::fs::read_to_string(&self.path).map_err(|error| {
            let kind = if error.kind() == ErrorKind::NotFound {
                CoreErrorKind::NotFound
            } else {
                CoreErrorKind::Io
            };
            CoreError::new(kind, format!("failed to read manifest: {error}"))
                .with_origin(&self.path)
        })
    }
}

pub struct InlineManifestSource {
    text: String,
}

impl InlineManifestSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ManifestSource for InlineManifestSource {
    fn origin(&self) -> Option<&Path> {
        None
    }

    fn read(&self) -> CoreResult<String> {
        Ok(self.text.clone())
    }
}

pub fn load(source: &dyn ManifestSource, format: ManifestFormat) -> CoreResult<Manifest> {
    let text = source.read()?;
    tracing::debug!(
        origin = ?source.origin(),
        bytes = text.len(),
        format = ?format,
        "loaded manifest text"
    );

    codec::parse(&text, format).map_err(|error| match source.origin() {
        Some(origin) => error.with_origin(origin),
        None => error,
    })
}

/// Replaces `path` with `contents` via a sibling temp file and a rename, so
/// a reader never observes a half-written manifest.
pub fn write_atomically(path: &Path, contents: &str) -> CoreResult<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            CoreError::new(CoreErrorKind::InvalidInput, "manifest path has no file name")
                .with_origin(path)
        })?;
    let temp_path = path.with_file_name(format!(".{file_name}.berth-tmp"));

    let io_error = |error: std::io::Error| {
        CoreError::new(
            CoreErrorKind::Io,
            format!("failed to write manifest: {error}"),
        )
        .with_origin(path)
    };

    {
        let mut file = std::fs::File::create(&temp_path).map_err(io_error)?;
        file.write_all(contents.as_bytes()).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
    }

    if let Err(error) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(io_error(error));
    }

    Ok(())
}
