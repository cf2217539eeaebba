//! Method emission: one `Reset()` per selected struct, folded into an
//! explicit output accumulator in selection order.
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info};

use crate::error::Error;
use crate::ir::{ResolvedPackage, TypeDecl, TypeDescriptor};
use crate::scan::{scan_fields, FieldOmitted, ScannedField};
use crate::synth::{synthesize, ResetExpr, Synthesis};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub field: String,
    pub expr: ResetExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMethod {
    pub struct_name: String,
    pub receiver: String,
    pub assignments: Vec<Assignment>,         // field declaration order
    pub omitted: Vec<(String, FieldOmitted)>, // kept for reporting only
}

/// Everything generated so far; rendered only once the whole run succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub package_path: String,
    pub package_name: String,
    pub methods: Vec<GeneratedMethod>,
}

impl Output {
    pub fn new(pkg: &ResolvedPackage) -> Self {
        Self {
            package_path: pkg.path.clone(),
            package_name: pkg.name.clone(),
            methods: Vec::new(),
        }
    }
}

// ------------------------------- Emitter ---------------------------------- //

pub fn build_method(decl: &TypeDecl) -> Result<GeneratedMethod, Error> {
    let TypeDescriptor::Struct { fields } = &decl.underlying else {
        return Err(Error::NotAStruct {
            name: decl.name.clone(),
            category: decl.underlying.category(),
        });
    };

    let receiver: String = decl.name.chars().take(1).collect();
    let mut assignments = Vec::with_capacity(fields.len());
    let mut omitted: Vec<(String, FieldOmitted)> = Vec::new();

    for scanned in scan_fields(fields) {
        let spec = match scanned {
            ScannedField::Reset(spec) => spec,
            ScannedField::Omitted(o) => {
                omitted.push((o.field.to_string(), o.reason));
                continue;
            }
        };
        let synthesis = synthesize(spec.ty, spec.policy).map_err(|e| Error::UnsupportedType {
            struct_name: decl.name.clone(),
            field: spec.name.to_string(),
            category: e.category,
        })?;
        match synthesis {
            Synthesis::Assign(expr) => assignments.push(Assignment { field: spec.name.to_string(), expr }),
            Synthesis::Omit(reason) => {
                debug!(struct_name = %decl.name, field = spec.name, ?reason, "no reset value, skipping");
                omitted.push((spec.name.to_string(), reason));
            }
        }
    }

    Ok(GeneratedMethod { struct_name: decl.name.clone(), receiver, assignments, omitted })
}

/// Append the method for `decl` and hand the accumulator back.
pub fn emit_method(mut acc: Output, decl: &TypeDecl) -> Result<Output, Error> {
    let method = build_method(decl)?;
    info!(
        struct_name = %method.struct_name,
        assignments = method.assignments.len(),
        omitted = method.omitted.len(),
        "generated Reset"
    );
    acc.methods.push(method);
    Ok(acc)
}

// ------------------------------- Front API -------------------------------- //

/// Pick the declarations to process: the named ones in the given order (first
/// occurrence wins), or every struct in declaration order when `names` is empty.
pub fn select<'a>(pkg: &'a ResolvedPackage, names: &[String]) -> Result<Vec<&'a TypeDecl>, Error> {
    if names.is_empty() {
        return Ok(pkg.types.iter().filter(|d| d.is_struct()).collect());
    }
    let by_name: IndexMap<&str, &TypeDecl> = pkg.types.iter().map(|d| (d.name.as_str(), d)).collect();
    let requested: IndexSet<&str> = names.iter().map(String::as_str).collect();
    requested
        .into_iter()
        .map(|name| by_name.get(name).copied().ok_or_else(|| Error::UnknownType(name.to_string())))
        .collect()
}

/// Whole run. Any error discards everything generated so far.
pub fn run(pkg: &ResolvedPackage, names: &[String]) -> Result<Output, Error> {
    pkg.ensure_resolved()?;
    let selected = select(pkg, names)?;
    let output = selected.into_iter().try_fold(Output::new(pkg), emit_method)?;
    info!(package = %output.package_path, methods = output.methods.len(), "run complete");
    Ok(output)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::FieldDecl;
    use crate::ir::BasicKind;

    fn decl(name: &str, fields: Vec<FieldDecl>) -> TypeDecl {
        TypeDecl { name: name.into(), underlying: TypeDescriptor::Struct { fields } }
    }

    fn package(types: Vec<TypeDecl>) -> ResolvedPackage {
        ResolvedPackage { path: "example.com/app".into(), name: "app".into(), errors: vec![], types }
    }

    fn int() -> TypeDescriptor { TypeDescriptor::basic("int") }

    #[test]
    fn scenario_a_assigns_in_declaration_order() {
        let method = build_method(&decl("Acc", vec![
            FieldDecl::new("A", int()),
            FieldDecl::new("B", TypeDescriptor::basic("string")),
        ])).unwrap();
        assert_eq!(method.receiver, "A");
        assert_eq!(method.assignments, vec![
            Assignment { field: "A".into(), expr: ResetExpr::Literal("0") },
            Assignment { field: "B".into(), expr: ResetExpr::Literal("\"\"") },
        ]);
        assert!(method.omitted.is_empty());
    }

    #[test]
    fn scenario_b_unresolved_field_is_dropped_without_error() {
        let method = build_method(&decl("S", vec![
            FieldDecl::new("A", int()),
            FieldDecl { name: Some("X".into()), ty: None, tag: None },
        ])).unwrap();
        assert_eq!(method.assignments.len(), 1);
        assert_eq!(method.assignments[0].field, "A");
        assert_eq!(method.omitted, vec![("X".to_string(), FieldOmitted::Unresolved)]);
    }

    #[test]
    fn omission_reasons_stay_distinct() {
        let method = build_method(&decl("S", vec![
            FieldDecl::new("Ratio", TypeDescriptor::basic("float64")),
            FieldDecl { name: Some("X".into()), ty: None, tag: None },
        ])).unwrap();
        assert!(method.assignments.is_empty());
        assert_eq!(method.omitted, vec![
            ("Ratio".to_string(), FieldOmitted::NoResetForKind { kind: BasicKind::Float }),
            ("X".to_string(), FieldOmitted::Unresolved),
        ]);
    }

    #[test]
    fn omissions_follow_declaration_order() {
        let method = build_method(&decl("S", vec![
            FieldDecl::new("A", int()),
            FieldDecl::new("Z", TypeDescriptor::basic("float64")),
            FieldDecl { name: Some("X".into()), ty: None, tag: None },
            FieldDecl::new("On", TypeDescriptor::basic("bool")),
        ])).unwrap();
        assert_eq!(method.assignments.len(), 1);
        let order: Vec<_> = method.omitted.iter().map(|(field, _)| field.as_str()).collect();
        assert_eq!(order, ["Z", "X", "On"]);
    }

    #[test]
    fn scenario_d_struct_field_aborts_whole_run() {
        let point = TypeDescriptor::named(None, "Point", TypeDescriptor::Struct { fields: vec![] });
        let pkg = package(vec![
            decl("Fine", vec![FieldDecl::new("A", int())]),
            decl("Broken", vec![FieldDecl::new("At", point)]),
            decl("AlsoFine", vec![FieldDecl::new("B", int())]),
        ]);
        match run(&pkg, &[]) {
            Err(Error::UnsupportedType { struct_name, field, category }) => {
                assert_eq!((struct_name.as_str(), field.as_str(), category), ("Broken", "At", "struct"));
            }
            other => panic!("expected UnsupportedType, got {other:?}"),
        }
    }

    #[test]
    fn selection_follows_requested_order() {
        let pkg = package(vec![
            decl("First", vec![]),
            TypeDecl { name: "Alias".into(), underlying: int() },
            decl("Second", vec![]),
        ]);
        let all = run(&pkg, &[]).unwrap();
        let names: Vec<_> = all.methods.iter().map(|m| m.struct_name.as_str()).collect();
        assert_eq!(names, ["First", "Second"]);

        let picked = run(&pkg, &["Second".to_string(), "First".to_string()]).unwrap();
        let names: Vec<_> = picked.methods.iter().map(|m| m.struct_name.as_str()).collect();
        assert_eq!(names, ["Second", "First"]);
    }

    #[test]
    fn repeated_names_select_once() {
        let pkg = package(vec![decl("S", vec![FieldDecl::new("A", int())]), decl("T", vec![])]);
        let picked = run(&pkg, &["S".to_string(), "T".to_string(), "S".to_string()]).unwrap();
        let names: Vec<_> = picked.methods.iter().map(|m| m.struct_name.as_str()).collect();
        assert_eq!(names, ["S", "T"]);

        let go = crate::generate(&pkg, &["S".to_string(), "S".to_string()]).unwrap();
        assert_eq!(go.matches("func (S *S) Reset()").count(), 1);
    }

    #[test]
    fn selecting_a_non_struct_or_missing_type_fails() {
        let pkg = package(vec![TypeDecl { name: "Alias".into(), underlying: int() }]);
        assert!(matches!(run(&pkg, &["Alias".to_string()]), Err(Error::NotAStruct { category: "basic", .. })));
        assert!(matches!(run(&pkg, &["Nope".to_string()]), Err(Error::UnknownType(name)) if name == "Nope"));
    }

    #[test]
    fn resolution_errors_stop_before_any_struct() {
        let mut pkg = package(vec![decl("S", vec![FieldDecl::new("A", int())])]);
        pkg.errors.push("s.go:1:1: expected 'package'".into());
        assert!(matches!(run(&pkg, &[]), Err(Error::Resolution { .. })));
    }
}
