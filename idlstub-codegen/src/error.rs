// Error types for the idlstub code generator.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort generation of a module.
///
/// Descriptor problems are upstream precondition violations: they are
/// reported instead of emitting a wrapper that would not compile.
#[derive(Error, Debug)]
pub enum GenError {
    #[error("function {function}: duplicate parameter `{name}`")]
    DuplicateParameter { function: String, name: String },

    #[error("function {function}: parameter `{param}` depends on unknown name `{name}`")]
    UnresolvedDependency { function: String, param: String, name: String },

    #[error("interface {interface}: unknown super interface `{super_interface}`")]
    UnknownInterface { interface: String, super_interface: String },

    #[error("failed to read config {path}: {source}")]
    ConfigRead { path: PathBuf, source: std::io::Error },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse { path: PathBuf, source: toml::de::Error },

    #[error("failed to read descriptors {path}: {source}")]
    DescriptorRead { path: PathBuf, source: std::io::Error },

    #[error("failed to parse descriptors {path}: {source}")]
    DescriptorParse { path: PathBuf, source: serde_json::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
}

/// Convenience alias used throughout the generator.
pub type GenResult<T> = Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_are_human_readable() {
        let err = GenError::DuplicateParameter { function: "f".into(), name: "x".into() };
        assert_eq!(err.to_string(), "function f: duplicate parameter `x`");

        let err = GenError::UnresolvedDependency {
            function: "fill".into(),
            param: "buf".into(),
            name: "len".into(),
        };
        assert_eq!(
            err.to_string(),
            "function fill: parameter `buf` depends on unknown name `len`"
        );
    }
}
