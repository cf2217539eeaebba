use thiserror::Error;

/// A type the synthesizer cannot reset or spell out. Carries only the
/// category; the emitter attaches the struct and field it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported type category `{category}`")]
pub struct UnsupportedType {
    pub category: &'static str,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("package {package} does not type-check:\n  {}", .errors.join("\n  "))]
    Resolution { package: String, errors: Vec<String> },

    #[error("type {name} is a {category}, not a struct")]
    NotAStruct { name: String, category: &'static str },

    #[error("{struct_name}.{field}: unsupported type category `{category}`")]
    UnsupportedType { struct_name: String, field: String, category: &'static str },

    #[error("type {0} is not declared in the package")]
    UnknownType(String),

    #[error("inputs describe different packages: {expected} and {found}")]
    PackageMismatch { expected: String, found: String },

    #[error("failed to decode resolver document at JSON path {path}: {source}")]
    Decode { path: String, source: serde_json::Error },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
