//! Explicit Go type mentions for construction sites (`make(T)`, `T{}`, `&T{}`).
//!
//! Built structurally from the descriptor: qualifiers come from the `Named`
//! path, pointers keep their element, so nesting never needs re-parsing.
use crate::codegen::Imports;
use crate::error::UnsupportedType;
use crate::ir::TypeDescriptor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Ident(String),                          // local or predeclared name
    Qualified { path: String, name: String },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array(u64, Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
    Chan(Box<TypeExpr>),                    // always bidirectional
}

pub fn render(ty: &TypeDescriptor) -> Result<TypeExpr, UnsupportedType> {
    let expr = match ty {
        // `unsafe.Pointer` is the one basic type living in a package
        TypeDescriptor::Basic { name } => match name.rsplit_once('.') {
            Some((path, name)) => TypeExpr::Qualified { path: path.to_string(), name: name.to_string() },
            None => TypeExpr::Ident(name.clone()),
        },
        TypeDescriptor::Named { path: Some(path), name, .. } => TypeExpr::Qualified {
            path: path.clone(),
            name: name.clone(),
        },
        TypeDescriptor::Named { path: None, name, .. } => TypeExpr::Ident(name.clone()),
        TypeDescriptor::Pointer { elem } => TypeExpr::Pointer(Box::new(render(elem)?)),
        TypeDescriptor::Slice { elem } => TypeExpr::Slice(Box::new(render(elem)?)),
        TypeDescriptor::Array { elem, len } => TypeExpr::Array(*len, Box::new(render(elem)?)),
        TypeDescriptor::Map { key, elem } => {
            TypeExpr::Map(Box::new(render(key)?), Box::new(render(elem)?))
        }
        TypeDescriptor::Chan { elem } => TypeExpr::Chan(Box::new(render(elem)?)),
        TypeDescriptor::Struct { .. } | TypeDescriptor::Interface | TypeDescriptor::Signature => {
            return Err(UnsupportedType { category: ty.category() });
        }
    };
    Ok(expr)
}

impl TypeExpr {
    /// Every import path this mention needs, outermost first.
    pub fn visit_paths<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            TypeExpr::Ident(_) => {}
            TypeExpr::Qualified { path, .. } => f(path),
            TypeExpr::Pointer(elem)
            | TypeExpr::Slice(elem)
            | TypeExpr::Array(_, elem)
            | TypeExpr::Chan(elem) => elem.visit_paths(f),
            TypeExpr::Map(key, elem) => {
                key.visit_paths(f);
                elem.visit_paths(f);
            }
        }
    }

    /// Go spelling, with qualifiers resolved against `imports`.
    pub fn go(&self, imports: &Imports) -> String {
        let mut out = String::new();
        self.write_go(&mut out, imports);
        out
    }

    fn write_go(&self, out: &mut String, imports: &Imports) {
        match self {
            TypeExpr::Ident(name) => out.push_str(name),
            TypeExpr::Qualified { path, name } => {
                if let Some(alias) = imports.qualifier(path) {
                    out.push_str(&alias);
                    out.push('.');
                }
                out.push_str(name);
            }
            TypeExpr::Pointer(elem) => {
                out.push('*');
                elem.write_go(out, imports);
            }
            TypeExpr::Slice(elem) => {
                out.push_str("[]");
                elem.write_go(out, imports);
            }
            TypeExpr::Array(len, elem) => {
                out.push_str(&format!("[{len}]"));
                elem.write_go(out, imports);
            }
            TypeExpr::Map(key, elem) => {
                out.push_str("map[");
                key.write_go(out, imports);
                out.push(']');
                elem.write_go(out, imports);
            }
            TypeExpr::Chan(elem) => {
                out.push_str("chan ");
                elem.write_go(out, imports);
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
