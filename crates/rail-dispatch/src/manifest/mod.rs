//! Manifest generation and persistence.
//!
//! The manifest tells a remote controller what it may call. It is derived
//! from the same [`Catalog`] the dispatcher resolves against, or supplied by
//! the host as hand-written JSON when the host wants to publish something
//! richer than the generated shape.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::catalog::{Catalog, MethodDescriptor};

/// Language tag published in generated manifests.
pub const MANIFEST_LANGUAGE: &str = "rust";

/// Errors raised while preparing or persisting a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A custom manifest is not valid JSON.
    #[error("custom manifest is not valid JSON: {0}")]
    InvalidCustom(#[source] serde_json::Error),

    /// The manifest could not be serialised.
    #[error("failed to serialise manifest: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The manifest could not be written.
    #[error("failed to write manifest to {path}: {source}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

impl ManifestError {
    fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }
}

/// A parameter entry in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterEntry {
    /// Parameter name.
    pub name: String,
    /// Type name as reported by [`crate::ValueType::name`].
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A callable function entry in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEntry {
    /// Qualified `Type.Method` name.
    pub name: String,
    /// Description metadata; empty when none was declared.
    pub description: String,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterEntry>,
}

impl From<&MethodDescriptor> for FunctionEntry {
    fn from(method: &MethodDescriptor) -> Self {
        Self {
            name: method.qualified_name(),
            description: method.description().unwrap_or_default().to_owned(),
            parameters: method
                .parameters()
                .iter()
                .map(|param| ParameterEntry {
                    name: param.name().to_owned(),
                    type_name: param.value_type().name().to_owned(),
                })
                .collect(),
        }
    }
}

/// Generated description of every dispatchable method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Implementation language tag.
    pub language: String,
    /// Name of the hosting application.
    pub app_name: String,
    /// One entry per registered method.
    pub functions: Vec<FunctionEntry>,
}

impl Manifest {
    /// Walks `catalog` and describes every registered method.
    ///
    /// Entry order is not significant. Classes are visited by name so the
    /// output is stable for a given catalog.
    pub fn generate(app_name: impl Into<String>, catalog: &Catalog) -> Self {
        let mut classes: Vec<_> = catalog.classes().collect();
        classes.sort_by(|left, right| left.name().cmp(right.name()));
        let functions = classes
            .into_iter()
            .flat_map(|class| class.methods().iter().map(FunctionEntry::from))
            .collect();
        Self {
            language: MANIFEST_LANGUAGE.to_owned(),
            app_name: app_name.into(),
            functions,
        }
    }

    /// Looks a function entry up by its qualified name.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&FunctionEntry> {
        self.functions.iter().find(|entry| entry.name == name)
    }

    /// Compact JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Serialize`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        serde_json::to_string(self).map_err(ManifestError::Serialize)
    }

    /// Indented JSON text, as written to disk.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Serialize`] if serialisation fails.
    pub fn to_json_pretty(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(ManifestError::Serialize)
    }
}

/// The manifest a host publishes: generated from the catalog or supplied
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestDocument {
    /// Derived from the catalog.
    Generated(Manifest),
    /// Host-authored JSON. Its shape is not enforced.
    Custom(String),
}

impl ManifestDocument {
    /// Accepts host-authored manifest text after checking that it is JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::InvalidCustom`] when `text` does not parse.
    pub fn custom(text: impl Into<String>) -> Result<Self, ManifestError> {
        let owned = text.into();
        serde_json::from_str::<serde_json::Value>(&owned).map_err(ManifestError::InvalidCustom)?;
        Ok(Self::Custom(owned))
    }

    /// Text handed to the bridge and written to disk.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Serialize`] if a generated manifest cannot be
    /// serialised.
    pub fn to_text(&self) -> Result<String, ManifestError> {
        match self {
            Self::Generated(manifest) => manifest.to_json_pretty(),
            Self::Custom(text) => Ok(text.clone()),
        }
    }
}

/// Writes manifest text to `path`, replacing any previous file atomically.
///
/// The text is written to a temporary file in the destination directory and
/// then renamed into place, so readers never observe a partial manifest.
///
/// # Errors
///
/// Returns [`ManifestError::Write`] if the file cannot be created, written or
/// renamed.
pub fn write_manifest(path: &Path, text: &str) -> Result<(), ManifestError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staging =
        NamedTempFile::new_in(directory).map_err(|error| ManifestError::write(path, error))?;
    staging
        .write_all(text.as_bytes())
        .and_then(|()| staging.flush())
        .map_err(|error| ManifestError::write(path, error))?;
    staging
        .persist(path)
        .map_err(|error| ManifestError::write(path, error.error))?;
    Ok(())
}
