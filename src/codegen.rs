//! Go source rendering for an accumulated run.
//!
//! Output is already close to `gofmt` style (tabs, sorted imports) but final
//! canonicalization is left to the caller's formatter.
use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Value};

use crate::emit::{GeneratedMethod, Output};
use crate::ir::TypeDescriptor;
use crate::synth::{ConstructKind, ResetExpr};

pub const HEADER: &str = "// Code generated by reset-gen. DO NOT EDIT.";

// ------------------------------- Imports ---------------------------------- //

/// Import paths referenced by the generated file and the names they bind.
#[derive(Debug, Clone)]
pub struct Imports {
    local: String,
    aliases: BTreeMap<String, String>, // path -> alias, sorted like gofmt
}

impl Imports {
    pub fn new(local_path: impl Into<String>) -> Self {
        Self { local: local_path.into(), aliases: BTreeMap::new() }
    }

    /// Collect every path an output references; aliases are assigned in path
    /// order so the result does not depend on visiting order.
    pub fn collect(output: &Output) -> Self {
        let mut paths = BTreeSet::new();
        for method in &output.methods {
            for assignment in &method.assignments {
                if let ResetExpr::Construct { ty, .. } = &assignment.expr {
                    ty.visit_paths(&mut |p| {
                        paths.insert(p);
                    });
                }
            }
        }
        let mut imports = Imports::new(output.package_path.clone());
        for path in paths {
            imports.add(path);
        }
        imports
    }

    pub fn add(&mut self, path: &str) {
        if path == self.local || self.aliases.contains_key(path) {
            return;
        }
        let base = guess_alias(path);
        let mut alias = base.clone();
        let mut n = 2;
        while self.aliases.values().any(|a| *a == alias) {
            alias = format!("{base}{n}");
            n += 1;
        }
        self.aliases.insert(path.to_string(), alias);
    }

    /// Name to prefix a type from `path` with; `None` for the package itself.
    pub fn qualifier(&self, path: &str) -> Option<String> {
        if path == self.local {
            return None;
        }
        Some(self.aliases.get(path).cloned().unwrap_or_else(|| guess_alias(path)))
    }

    pub fn is_empty(&self) -> bool { self.aliases.is_empty() }

    fn write_block(&self, out: &mut String) {
        let line = |path: &str, alias: &str| {
            if last_segment(path) == alias {
                format!("{path:?}")
            } else {
                format!("{alias} {path:?}")
            }
        };
        match self.aliases.len() {
            0 => {}
            1 => {
                let (path, alias) = self.aliases.iter().next().expect("one import");
                out.push_str(&format!("import {}\n\n", line(path.as_str(), alias.as_str())));
            }
            _ => {
                out.push_str("import (\n");
                for (path, alias) in &self.aliases {
                    out.push_str(&format!("\t{}\n", line(path.as_str(), alias.as_str())));
                }
                out.push_str(")\n\n");
            }
        }
    }
}

fn last_segment(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

// `example.com/go-yaml/v3` -> `yaml`
fn guess_alias(path: &str) -> String {
    let mut segments = path.trim_end_matches('/').rsplit('/');
    let mut name = segments.next().unwrap_or(path);
    let is_version = name.len() > 1
        && name.starts_with('v')
        && name[1..].bytes().all(|b| b.is_ascii_digit());
    if is_version {
        name = segments.next().unwrap_or(name);
    }
    let name = name.strip_prefix("go-").unwrap_or(name);
    let name = name.strip_suffix("-go").or_else(|| name.strip_suffix(".go")).unwrap_or(name);
    let alias: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_ascii_lowercase();
    match alias.chars().next() {
        None => "pkg".to_string(),
        Some(c) if c.is_ascii_digit() => format!("pkg{alias}"),
        Some(_) => alias,
    }
}

// ------------------------------ Expressions ------------------------------- //

/// Go spelling of a reset expression.
pub fn expr_go(expr: &ResetExpr, imports: &Imports) -> String {
    match expr {
        ResetExpr::Literal(text) => text.to_string(),
        ResetExpr::Nil => "nil".to_string(),
        ResetExpr::Construct { kind, of, ty } => {
            let ty = ty.go(imports);
            match kind {
                ConstructKind::CompositeLiteral => format!("{ty}{{}}"),
                ConstructKind::Make => match of.underlying() {
                    TypeDescriptor::Slice { .. } => format!("make({ty}, 0)"),
                    _ => format!("make({ty})"),
                },
                ConstructKind::AddressOfComposite if of.admits_composite_literal() => format!("&{ty}{{}}"),
                ConstructKind::AddressOfComposite => format!("new({ty})"),
            }
        }
    }
}

// -------------------------------- Codegen --------------------------------- //

pub struct Codegen {
    out: String,
}

impl Codegen {
    pub fn new() -> Self {
        Self { out: String::new() }
    }

    /// Render a complete Go file for `output`.
    pub fn emit(&mut self, output: &Output) {
        let imports = Imports::collect(output);

        self.out.push_str(HEADER);
        self.out.push('\n');
        self.out.push_str(&format!("package {}\n\n", output.package_name));
        imports.write_block(&mut self.out);

        for (i, method) in output.methods.iter().enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            self.emit_method(method, &imports);
        }
    }

    fn emit_method(&mut self, method: &GeneratedMethod, imports: &Imports) {
        let recv = &method.receiver;
        let head = format!("func ({recv} *{}) Reset() {{", method.struct_name);
        if method.assignments.is_empty() {
            self.out.push_str(&format!("{head}}}\n"));
            return;
        }
        self.out.push_str(&head);
        self.out.push('\n');
        for assignment in &method.assignments {
            let value = expr_go(&assignment.expr, imports);
            self.out.push_str(&format!("\t{recv}.{} = {value}\n", assignment.field));
        }
        self.out.push_str("}\n");
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl Default for Codegen {
    fn default() -> Self { Self::new() }
}

// --------------------------------- Plan ----------------------------------- //

/// JSON view of what a run would generate, omissions included.
pub fn emit_plan(output: &Output) -> Value {
    let imports = Imports::collect(output);
    let methods: Vec<Value> = output.methods.iter().map(|method| {
        let assignments: Vec<Value> = method.assignments.iter().map(|a| json!({
            "field": a.field,
            "value": expr_go(&a.expr, &imports),
        })).collect();
        let omitted: Vec<Value> = method.omitted.iter().map(|(field, reason)| {
            let mut o = json!({ "field": field });
            if let (Value::Object(obj), Ok(Value::Object(r))) = (&mut o, serde_json::to_value(reason)) {
                obj.extend(r);
            }
            o
        }).collect();
        json!({
            "struct": method.struct_name,
            "receiver": method.receiver,
            "assignments": assignments,
            "omitted": omitted,
        })
    }).collect();

    let imports: Vec<Value> = imports.aliases.iter().map(|(path, alias)| json!({
        "path": path,
        "alias": alias,
    })).collect();

    json!({
        "package": output.package_path,
        "imports": imports,
        "methods": methods,
    })
}

// ------------------------------- Tests ------------------------------------ //
