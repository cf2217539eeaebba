//! Go `Reset()` method synthesis from resolved struct declarations.
//!
//! Pipeline, per selected struct: `scan` fields → `synth` reset expressions
//! (spelling construction types through `type_expr`) → `emit` into the run's
//! output → `codegen` renders the Go file once the whole run succeeded.
pub mod ir;
pub mod error;
pub mod scan;
pub mod synth;
pub mod type_expr;
pub mod emit;
pub mod codegen;
pub mod path_de;

pub use error::{Error, UnsupportedType};
pub use ir::{BasicKind, FieldDecl, ResolvedPackage, TypeDecl, TypeDescriptor};
pub use emit::{GeneratedMethod, Output};

/// Generate the Go source for `names` (every struct when empty).
pub fn generate(package: &ResolvedPackage, names: &[String]) -> Result<String, Error> {
    let output = emit::run(package, names)?;
    let mut cg = codegen::Codegen::new();
    cg.emit(&output);
    Ok(cg.into_string())
}
