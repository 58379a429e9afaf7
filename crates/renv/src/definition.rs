//! variable definitions and where they come from
//!
//! A definition file is a YAML document with a top-level `environment` mapping:
//!
//! ```yaml
//! environment:
//!   BASE: /opt/app
//!   BIN: ${BASE}/bin
//! ```
//!
//! Values are scalars taken as written (`PORT: 8080` is `"8080"`). An empty value or `~`
//! is the empty string. Nested sequences or mappings are rejected.
use std::path::{Path, PathBuf};

/// Declared variables: name -> raw (unexpanded) value
///
/// Declaration order is kept, it decides which of several valid orders is used.
pub type RawDefinition = indexmap::IndexMap<String, String>;

/// Where a [Definition] was loaded from. `None` for stdin or inline documents.
pub type Source = Option<PathBuf>;

#[derive(serde::Deserialize, Debug, Default)]
struct DefinitionFile {
    #[serde(default, deserialize_with = "null_as_empty")]
    environment: RawDefinition,
}

/// `environment:` without entries is empty, `NAME:` or `NAME: ~` is `""`
fn null_as_empty<'de, D>(deserializer: D) -> Result<RawDefinition, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    let environment: Option<indexmap::IndexMap<String, Option<String>>> =
        Deserialize::deserialize(deserializer)?;

    Ok(environment
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| (name, value.unwrap_or_default()))
        .collect())
}

/// A [RawDefinition] together with its source
#[derive(Debug, Default)]
pub struct Definition {
    pub source: Source,
    pub variables: RawDefinition,
}

impl Definition {
    pub fn new(variables: RawDefinition, source: impl Into<Source>) -> Self {
        Self {
            source: source.into(),
            variables,
        }
    }

    /// Parse a definition document
    pub fn from_yaml(text: &str, source: impl Into<Source>) -> Result<Self, LoadError> {
        let source = source.into();

        // an empty document is an empty definition, not an error
        if text.trim().is_empty() {
            return Ok(Self::new(Default::default(), source));
        }

        match serde_yaml::from_str::<DefinitionFile>(text) {
            Ok(file) => {
                tracing::debug!(variables = file.environment.len(), "definition parsed");
                Ok(Self::new(file.environment, source))
            }
            Err(error) => Err(LoadError::Parse {
                source_name: display_source(&source),
                error,
            }),
        }
    }

    pub fn load_file(file_path: &Path) -> Result<Self, LoadError> {
        let file_path = file_path.canonicalize().map_err(|e| LoadError::io(file_path, e))?;
        tracing::info!(path=%file_path.display(), "loading file");

        let file_contents =
            std::fs::read_to_string(&file_path).map_err(|e| LoadError::io(&file_path, e))?;
        Self::from_yaml(&file_contents, file_path)
    }

    /// Load every definition file in `dir_path`, ordered by file name
    ///
    /// Definition files are files whose name ends with `env.yaml` or `env.yml`
    /// (`env.yaml`, `.env.yaml`, `build.env.yml`, ...).
    pub fn load_directory(dir_path: &Path) -> Result<Vec<Self>, LoadError> {
        let mut file_paths = vec![];

        let read_dir = std::fs::read_dir(dir_path).map_err(|e| LoadError::io(dir_path, e))?;
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|e| LoadError::io(dir_path, e))?;
            let file_type = dir_entry
                .file_type()
                .map_err(|e| LoadError::io(&dir_entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }

            if !is_definition_file_name(&dir_entry.file_name().to_string_lossy()) {
                continue;
            }

            file_paths.push(dir_entry.path());
        }

        if file_paths.is_empty() {
            return Err(LoadError::NoFilesFound(dir_path.to_owned()));
        }

        file_paths.sort();
        file_paths
            .iter()
            .map(|file_path| Self::load_file(file_path))
            .collect()
    }

    /// Human readable name of the source
    pub fn source_name(&self) -> String {
        display_source(&self.source)
    }
}

fn is_definition_file_name(file_name: &str) -> bool {
    file_name.ends_with("env.yaml") || file_name.ends_with("env.yml")
}

fn display_source(source: &Source) -> String {
    match source {
        Some(path) => path.display().to_string(),
        None => "<stdin>".to_string(),
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("No definition files found in {}", .0.display())]
    NoFilesFound(PathBuf),
    #[error("Unable to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
    #[error("Unable to parse {source_name}")]
    Parse {
        source_name: String,
        #[source]
        error: serde_yaml::Error,
    },
}

impl LoadError {
    fn io(path: &Path, error: std::io::Error) -> Self {
        Self::Io {
            path: path.to_owned(),
            error,
        }
    }
}

/// Utility macro to create a [RawDefinition]
///
/// ```
/// # use renv::definitions;
/// let definition = definitions! {
///     "BASE" => "/opt/app",
///     "BIN" => "${BASE}/bin",
/// };
/// assert_eq!(definition["BIN"], "${BASE}/bin");
/// ```
///
/// Later entries replace earlier ones with the same name.
#[macro_export]
macro_rules! definitions {
    {} => {
        $crate::definition::RawDefinition::new()
    };
    { $($name:expr => $value:expr),+ $(,)? } => {{
        let mut definition = $crate::definition::RawDefinition::new();
        $(
            definition.insert(::std::string::String::from($name), ::std::string::String::from($value));
        )+
        definition
    }};
}
