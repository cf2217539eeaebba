//! Reset expression synthesis.
//!
//! Maps a resolved field type plus its reset policy to the Go expression the
//! field is assigned in `Reset()`. Reference-like kinds (map, slice, chan,
//! pointer) reset to `nil` unless the field is tagged `reset:"nonil"`, in which
//! case a fresh empty value is constructed instead.
use crate::error::UnsupportedType;
use crate::ir::{BasicKind, TypeDescriptor};
use crate::scan::{FieldOmitted, ResetPolicy};
use crate::type_expr::{self, TypeExpr};

pub const ZERO: &str = "0";
pub const EMPTY_STRING: &str = "\"\"";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructKind {
    CompositeLiteral,        // T{}
    Make,                    // make(T) / make(T, 0)
    AddressOfComposite,      // &T{} or new(T); `of` is the pointee
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetExpr {
    Literal(&'static str),
    Nil,
    Construct {
        kind: ConstructKind,
        of: TypeDescriptor,
        ty: TypeExpr,        // `of`, spelled out
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesis {
    Assign(ResetExpr),
    Omit(FieldOmitted),
}

// Decision before the construction type is spelled out.
enum Choice<'a> {
    Literal(&'static str),
    Nil,
    Construct(ConstructKind, &'a TypeDescriptor),
    Omit(FieldOmitted),
}

pub fn synthesize(ty: &TypeDescriptor, policy: ResetPolicy) -> Result<Synthesis, UnsupportedType> {
    let synthesis = match choose(ty, policy)? {
        Choice::Literal(text) => Synthesis::Assign(ResetExpr::Literal(text)),
        Choice::Nil => Synthesis::Assign(ResetExpr::Nil),
        Choice::Construct(kind, of) => Synthesis::Assign(ResetExpr::Construct {
            kind,
            ty: type_expr::render(of)?,
            of: of.clone(),
        }),
        Choice::Omit(reason) => Synthesis::Omit(reason),
    };
    Ok(synthesis)
}

fn choose(ty: &TypeDescriptor, policy: ResetPolicy) -> Result<Choice<'_>, UnsupportedType> {
    let non_nil = policy == ResetPolicy::NonNil;
    let choice = match ty {
        TypeDescriptor::Basic { name } => match BasicKind::of(name) {
            BasicKind::Integer => Choice::Literal(ZERO),
            BasicKind::String => Choice::Literal(EMPTY_STRING),
            kind => Choice::Omit(FieldOmitted::NoResetForKind { kind }),
        },
        // value type: the empty literal zeroes every element, nil is not an option
        TypeDescriptor::Array { .. } => Choice::Construct(ConstructKind::CompositeLiteral, ty),
        TypeDescriptor::Map { .. } | TypeDescriptor::Slice { .. } | TypeDescriptor::Chan { .. } => {
            if non_nil { Choice::Construct(ConstructKind::Make, ty) } else { Choice::Nil }
        }
        TypeDescriptor::Pointer { elem } => {
            if non_nil { Choice::Construct(ConstructKind::AddressOfComposite, elem) } else { Choice::Nil }
        }
        TypeDescriptor::Named { underlying, .. } => match choose(underlying, policy)? {
            // construct the declared type, not its structurally equal shape
            Choice::Construct(kind, of) if std::ptr::eq(of, &**underlying) => {
                Choice::Construct(kind, ty)
            }
            other => other,
        },
        TypeDescriptor::Struct { .. } | TypeDescriptor::Interface | TypeDescriptor::Signature => {
            return Err(UnsupportedType { category: ty.category() });
        }
    };
    Ok(choice)
}

// ------------------------------- Tests ------------------------------------ //
