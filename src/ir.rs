// Resolved type IR, as handed over by the external type resolver.
//
// Everything here is plain data: the resolver has already type-checked the
// package, so codegen only dispatches on shape.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Error;

// ------------------------------ Descriptors ------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicKind {
    Integer,
    Float,
    String,
    Boolean,
    Other,                   // complex numbers, unsafe.Pointer, untyped nil, ...
}

impl BasicKind {
    /// Classify a predeclared Go type name.
    pub fn of(name: &str) -> Self {
        match name {
            "int" | "int8" | "int16" | "int32" | "int64"
            | "uint" | "uint8" | "uint16" | "uint32" | "uint64" | "uintptr"
            | "byte" | "rune" => BasicKind::Integer,
            "float32" | "float64" => BasicKind::Float,
            "string" => BasicKind::String,
            "bool" => BasicKind::Boolean,
            _ => BasicKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    Basic {
        name: String,        // predeclared name, e.g. `int64`
    },
    Named {
        /// Import path of the declaring package; absent for local/universe names.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        name: String,
        underlying: Box<TypeDescriptor>,
    },
    Pointer { elem: Box<TypeDescriptor> },
    Slice { elem: Box<TypeDescriptor> },
    Array { elem: Box<TypeDescriptor>, len: u64 },
    Map { key: Box<TypeDescriptor>, elem: Box<TypeDescriptor> },
    Chan { elem: Box<TypeDescriptor> },      // direction is not carried
    Struct {
        #[serde(default)]
        fields: Vec<FieldDecl>,
    },
    Interface,
    Signature,
}

impl TypeDescriptor {
    pub fn basic(name: impl Into<String>) -> Self {
        TypeDescriptor::Basic { name: name.into() }
    }

    pub fn named(path: Option<&str>, name: impl Into<String>, underlying: TypeDescriptor) -> Self {
        TypeDescriptor::Named {
            path: path.map(str::to_string),
            name: name.into(),
            underlying: Box::new(underlying),
        }
    }

    pub fn pointer(elem: TypeDescriptor) -> Self { TypeDescriptor::Pointer { elem: Box::new(elem) } }
    pub fn slice(elem: TypeDescriptor) -> Self { TypeDescriptor::Slice { elem: Box::new(elem) } }
    pub fn chan(elem: TypeDescriptor) -> Self { TypeDescriptor::Chan { elem: Box::new(elem) } }

    pub fn array(elem: TypeDescriptor, len: u64) -> Self {
        TypeDescriptor::Array { elem: Box::new(elem), len }
    }

    pub fn map(key: TypeDescriptor, elem: TypeDescriptor) -> Self {
        TypeDescriptor::Map { key: Box::new(key), elem: Box::new(elem) }
    }

    /// Category name used in diagnostics.
    pub fn category(&self) -> &'static str {
        match self {
            TypeDescriptor::Basic { .. } => "basic",
            TypeDescriptor::Named { .. } => "named",
            TypeDescriptor::Pointer { .. } => "pointer",
            TypeDescriptor::Slice { .. } => "slice",
            TypeDescriptor::Array { .. } => "array",
            TypeDescriptor::Map { .. } => "map",
            TypeDescriptor::Chan { .. } => "chan",
            TypeDescriptor::Struct { .. } => "struct",
            TypeDescriptor::Interface => "interface",
            TypeDescriptor::Signature => "signature",
        }
    }

    /// Strip any number of `Named` layers.
    pub fn underlying(&self) -> &TypeDescriptor {
        match self {
            TypeDescriptor::Named { underlying, .. } => underlying.underlying(),
            other => other,
        }
    }

    /// Whether `T{}` is valid Go for this type.
    pub fn admits_composite_literal(&self) -> bool {
        matches!(
            self.underlying(),
            TypeDescriptor::Struct { .. }
                | TypeDescriptor::Array { .. }
                | TypeDescriptor::Slice { .. }
                | TypeDescriptor::Map { .. }
        )
    }
}

/// Go-style canonical spelling, the way `go/types` prints it.
impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Basic { name } => f.write_str(name),
            TypeDescriptor::Named { path: Some(path), name, .. } => write!(f, "{path}.{name}"),
            TypeDescriptor::Named { path: None, name, .. } => f.write_str(name),
            TypeDescriptor::Pointer { elem } => write!(f, "*{elem}"),
            TypeDescriptor::Slice { elem } => write!(f, "[]{elem}"),
            TypeDescriptor::Array { elem, len } => write!(f, "[{len}]{elem}"),
            TypeDescriptor::Map { key, elem } => write!(f, "map[{key}]{elem}"),
            TypeDescriptor::Chan { elem } => write!(f, "chan {elem}"),
            TypeDescriptor::Struct { .. } => f.write_str("struct{...}"),
            TypeDescriptor::Interface => f.write_str("interface{...}"),
            TypeDescriptor::Signature => f.write_str("func(...)"),
        }
    }
}

// ------------------------------ Declarations ------------------------------ //

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    #[serde(default)]
    pub name: Option<String>,           // None => embedded field
    #[serde(default, rename = "type")]
    pub ty: Option<TypeDescriptor>,     // None => resolver could not resolve it
    #[serde(default)]
    pub tag: Option<String>,            // raw tag literal, backquotes allowed
}

impl FieldDecl {
    pub fn new(name: &str, ty: TypeDescriptor) -> Self {
        Self { name: Some(name.to_string()), ty: Some(ty), tag: None }
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub underlying: TypeDescriptor,
}

impl TypeDecl {
    pub fn is_struct(&self) -> bool {
        matches!(self.underlying, TypeDescriptor::Struct { .. })
    }
}

/// One type-checked package, as produced by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPackage {
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub errors: Vec<String>,            // non-empty => package did not type-check
    #[serde(default)]
    pub types: Vec<TypeDecl>,           // declaration order
}

impl ResolvedPackage {
    /// Fail if the resolver reported type-checking errors.
    pub fn ensure_resolved(&self) -> Result<(), Error> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(Error::Resolution { package: self.path.clone(), errors: self.errors.clone() })
    }

    /// Concatenate declarations from another document of the same package.
    pub fn merge(mut self, other: ResolvedPackage) -> Result<Self, Error> {
        if self.path != other.path {
            return Err(Error::PackageMismatch { expected: self.path, found: other.path });
        }
        self.errors.extend(other.errors);
        self.types.extend(other.types);
        Ok(self)
    }
}

// ------------------------------- Tests ------------------------------------ //
