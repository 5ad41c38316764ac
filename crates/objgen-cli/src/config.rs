//! Run configuration: an optional TOML file merged with command line values

use anyhow::{Context, Result};
use objgen_codegen::GoCodegenConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of an `objgen.toml` file
///
/// ```toml
/// indexes = ["docs/AppKit", "docs/Foundation"]
/// package = "appkit"
/// classes = ["NSAlert", "NSButton"]
/// output = "appkit.go"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Documentation index directories, loaded in order
    pub indexes: Vec<PathBuf>,
    pub package: Option<String>,
    pub classes: Vec<String>,
    pub output: Option<PathBuf>,
    pub runtime_import: Option<String>,
    pub foundation_import: Option<String>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Values given on the command line; set fields win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub indexes: Vec<PathBuf>,
    pub package: Option<String>,
    pub classes: Vec<String>,
    pub output: Option<PathBuf>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub indexes: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub codegen: GoCodegenConfig,
}

impl Settings {
    /// Merge an optional config file with command line overrides.
    ///
    /// Relative paths from the file are taken relative to the file's
    /// directory.
    pub fn resolve(config_path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let (file, base) = match config_path {
            Some(path) => (
                FileConfig::from_file(path)?,
                path.parent().map(Path::to_path_buf),
            ),
            None => (FileConfig::default(), None),
        };
        let relative_to_file = |p: PathBuf| match &base {
            Some(dir) if p.is_relative() => dir.join(p),
            _ => p,
        };

        let indexes = if overrides.indexes.is_empty() {
            file.indexes.into_iter().map(&relative_to_file).collect()
        } else {
            overrides.indexes
        };
        if indexes.is_empty() {
            anyhow::bail!("No documentation index given; pass --index or set `indexes` in the config file");
        }

        let defaults = GoCodegenConfig::default();
        let codegen = GoCodegenConfig {
            package: overrides
                .package
                .or(file.package)
                .unwrap_or(defaults.package),
            runtime_import: file.runtime_import.unwrap_or(defaults.runtime_import),
            foundation_import: file
                .foundation_import
                .unwrap_or(defaults.foundation_import),
            classes: if overrides.classes.is_empty() {
                file.classes
            } else {
                overrides.classes
            },
        };

        Ok(Self {
            indexes,
            output: overrides.output.or(file.output.map(relative_to_file)),
            codegen,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_from_command_line() -> Result<()> {
        let settings = Settings::resolve(
            None,
            Overrides {
                indexes: vec![PathBuf::from("docs")],
                ..Default::default()
            },
        )?;
        assert_eq!(settings.indexes, vec![PathBuf::from("docs")]);
        assert_eq!(settings.output, None);
        assert_eq!(settings.codegen, GoCodegenConfig::default());
        Ok(())
    }

    #[test]
    fn test_command_line_wins_over_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("objgen.toml");
        fs::write(
            &path,
            r#"
indexes = ["AppKit"]
package = "cocoa"
classes = ["NSAlert"]
output = "out.go"
runtime_import = "example.com/objc"
"#,
        )?;

        let from_file = Settings::resolve(Some(path.as_path()), Overrides::default())?;
        assert_eq!(from_file.indexes, vec![dir.path().join("AppKit")]);
        assert_eq!(from_file.output, Some(dir.path().join("out.go")));
        assert_eq!(from_file.codegen.package, "cocoa");
        assert_eq!(from_file.codegen.classes, vec!["NSAlert".to_string()]);
        assert_eq!(from_file.codegen.runtime_import, "example.com/objc");

        let overridden = Settings::resolve(
            Some(path.as_path()),
            Overrides {
                package: Some("appkit".to_string()),
                classes: vec!["NSButton".to_string()],
                ..Default::default()
            },
        )?;
        assert_eq!(overridden.codegen.package, "appkit");
        assert_eq!(overridden.codegen.classes, vec!["NSButton".to_string()]);
        assert_eq!(overridden.indexes, vec![dir.path().join("AppKit")]);
        Ok(())
    }

    #[test]
    fn test_missing_index_is_an_error() {
        let err = Settings::resolve(None, Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("No documentation index"));
    }

    #[test]
    fn test_unknown_key_is_rejected() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("objgen.toml");
        fs::write(&path, "pakage = \"typo\"\n")?;
        let err = FileConfig::from_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("unknown field"));
        Ok(())
    }
}
