use std::fmt::Write;

use sha2::{Digest, Sha256};

use crate::models::{CoreError, CoreErrorKind, CoreResult, Manifest};

/// Lowercase hex SHA-256 of the manifest's canonical JSON form.
///
/// The canonical form is the serde JSON rendering: struct fields in
/// declaration order and maps sorted by key, so two manifests that parse to
/// the same record share a fingerprint however their source text was laid
/// out.
pub fn fingerprint(manifest: &Manifest) -> CoreResult<String> {
    let canonical = serde_json::to_vec(manifest).map_err(|error| {
        CoreError::new(
            CoreErrorKind::SerializeFailure,
            format!("failed to canonicalize manifest: {error}"),
        )
    })?;

    let digest = Sha256::digest(&canonical);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    Ok(hex)
}
