use std::path::Path;

use crate::models::{CoreError, CoreErrorKind, CoreResult, Manifest};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ManifestFormat {
    #[default]
    Toml,
    Json,
}

impl ManifestFormat {
    /// `.json` files are read as JSON; everything else (including the
    /// extension-less `.replit`) is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

pub fn parse(text: &str, format: ManifestFormat) -> CoreResult<Manifest> {
    let manifest = match format {
        ManifestFormat::Toml => toml::from_str::<Manifest>(text).map_err(|error| {
            CoreError::new(
                CoreErrorKind::ParseFailure,
                format!("invalid TOML manifest: {}", error.message()),
            )
        })?,
        ManifestFormat::Json => serde_json::from_str::<Manifest>(text).map_err(|error| {
            CoreError::new(
                CoreErrorKind::ParseFailure,
                format!("invalid JSON manifest: {error}"),
            )
        })?,
    };

    if !manifest.extra.is_empty() {
        tracing::debug!(
            keys = ?manifest.extra.keys().collect::<Vec<_>>(),
            "manifest carries keys outside the known schema"
        );
    }

    Ok(manifest)
}

pub fn render(manifest: &Manifest, format: ManifestFormat) -> CoreResult<String> {
    match format {
        ManifestFormat::Toml => toml::to_string(manifest).map_err(|error| {
            CoreError::new(
                CoreErrorKind::SerializeFailure,
                format!("failed to render TOML manifest: {error}"),
            )
        }),
        ManifestFormat::Json => serde_json::to_string_pretty(manifest)
            .map(|mut rendered| {
                rendered.push('\n');
                rendered
            })
            .map_err(|error| {
                CoreError::new(
                    CoreErrorKind::SerializeFailure,
                    format!("failed to render JSON manifest: {error}"),
                )
            }),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{ManifestFormat, parse};
    use crate::models::CoreErrorKind;

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            ManifestFormat::from_path(Path::new(".replit")),
            ManifestFormat::Toml
        );
        assert_eq!(
            ManifestFormat::from_path(Path::new("replit.toml")),
            ManifestFormat::Toml
        );
        assert_eq!(
            ManifestFormat::from_path(Path::new("manifest.JSON")),
            ManifestFormat::Json
        );
    }

    #[test]
    fn malformed_toml_is_a_parse_failure() {
        let error = parse("entrypoint = ", ManifestFormat::Toml).unwrap_err();
        assert_eq!(error.kind, CoreErrorKind::ParseFailure);
        assert!(error.message.starts_with("invalid TOML manifest"));
    }

    #[test]
    fn out_of_range_port_is_a_parse_failure() {
        let text = "[[ports]]\nlocalPort = 70000\nexternalPort = 80\n";
        let error = parse(text, ManifestFormat::Toml).unwrap_err();
        assert_eq!(error.kind, CoreErrorKind::ParseFailure);
    }

    #[test]
    fn empty_document_is_an_empty_manifest() {
        let manifest = parse("", ManifestFormat::Toml).unwrap();
        assert!(manifest.entrypoint.is_none());
        assert!(manifest.ports.is_empty());
        assert!(manifest.extra.is_empty());
    }
}
