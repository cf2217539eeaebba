//! Field scanning: declared struct fields → `ScannedField`s in declaration order.
//!
//! Embedded fields are skipped outright. Fields the resolver could not type
//! come back as omissions in place, so callers can tell them apart from fields
//! that simply have no reset value.
use std::str::Chars;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::ir::{BasicKind, FieldDecl, TypeDescriptor};

pub const TAG_KEY: &str = "reset";
pub const TAG_NONIL: &str = "nonil";

// ------------------------------ Policy ------------------------------------ //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    #[default]
    Nilable,                 // reference-like fields reset to nil
    NonNil,                  // reference-like fields reset to a fresh empty value
}

impl ResetPolicy {
    pub fn from_tag(raw: Option<&str>) -> Self {
        match raw.and_then(|raw| StructTag::parse(raw).lookup(TAG_KEY)) {
            Some(value) if value == TAG_NONIL => ResetPolicy::NonNil,
            _ => ResetPolicy::Nilable,
        }
    }
}

/// Why a named field produced no assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FieldOmitted {
    /// The resolver handed over no type for the field.
    Unresolved,
    /// A basic kind without a defined reset literal.
    NoResetForKind { kind: BasicKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec<'a> {
    pub name: &'a str,
    pub ty: &'a TypeDescriptor,
    pub policy: ResetPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Omission<'a> {
    pub field: &'a str,
    pub reason: FieldOmitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannedField<'a> {
    Reset(FieldSpec<'a>),
    Omitted(Omission<'a>),
}

// ------------------------------ Scanner ----------------------------------- //

pub fn scan_fields(fields: &[FieldDecl]) -> Vec<ScannedField<'_>> {
    fields
        .iter()
        .filter_map(|field| {
            // embedded: reused through composition, never reset
            let name = field.name.as_deref()?;
            let Some(ty) = field.ty.as_ref() else {
                debug!(field = name, "no resolved type, skipping");
                return Some(ScannedField::Omitted(Omission { field: name, reason: FieldOmitted::Unresolved }));
            };
            Some(ScannedField::Reset(FieldSpec {
                name,
                ty,
                policy: ResetPolicy::from_tag(field.tag.as_deref()),
            }))
        })
        .collect()
}

// ---------------------------- Struct tags --------------------------------- //

// One `key:"value"` pair at the head of the remaining tag text.
static TAG_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^ *([^\x00-\x20:"\x7f]+):"((?:[^"\\]|\\.)*)""#).expect("static regex")
});

/// Go struct tag, `reflect.StructTag` conventions.
#[derive(Debug, Clone, Copy)]
pub struct StructTag<'a>(&'a str);

impl<'a> StructTag<'a> {
    /// Accepts the raw literal with or without its surrounding backquotes.
    pub fn parse(raw: &'a str) -> Self {
        Self(raw.trim_matches('`'))
    }

    /// Value for `key`; `None` if absent or if the tag is malformed before it.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let mut rest = self.0;
        while !rest.trim_start_matches(' ').is_empty() {
            let caps = TAG_PAIR.captures(rest)?;
            let whole = caps.get(0)?;
            if &caps[1] == key {
                return unquote(&caps[2]);
            }
            rest = &rest[whole.end()..];
        }
        None
    }
}

// Go double-quoted string body, `strconv.Unquote` escapes. `\x` and octal
// escapes produce raw bytes; invalid UTF-8 is replaced.
fn unquote(body: &str) -> Option<String> {
    let mut out: Vec<u8> = Vec::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            push_char(&mut out, c);
            continue;
        }
        match chars.next()? {
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '\\' => out.push(b'\\'),
            '"' => out.push(b'"'),
            'x' => out.push(u8::try_from(digits(&mut chars, 2, 16)?).ok()?),
            lead @ '0'..='7' => {
                let value = lead.to_digit(8)? * 64 + digits(&mut chars, 2, 8)?;
                out.push(u8::try_from(value).ok()?);
            }
            'u' => push_char(&mut out, char::from_u32(digits(&mut chars, 4, 16)?)?),
            'U' => push_char(&mut out, char::from_u32(digits(&mut chars, 8, 16)?)?),
            _ => return None,
        }
    }
    Some(String::from_utf8_lossy(&out).into_owned())
}

fn digits(chars: &mut Chars<'_>, count: usize, radix: u32) -> Option<u32> {
    (0..count).try_fold(0u32, |acc, _| Some(acc * radix + chars.next()?.to_digit(radix)?))
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_lookup_finds_key_among_others() {
        let tag = StructTag::parse(r#"`json:"items,omitempty" reset:"nonil"`"#);
        assert_eq!(tag.lookup("reset").as_deref(), Some("nonil"));
        assert_eq!(tag.lookup("json").as_deref(), Some("items,omitempty"));
        assert_eq!(tag.lookup("yaml"), None);
    }

    #[test]
    fn malformed_tag_stops_lookup() {
        // missing quotes before the key we want
        let tag = StructTag::parse(r#"json:items reset:"nonil""#);
        assert_eq!(tag.lookup("reset"), None);
    }

    #[test]
    fn escaped_quotes_are_unquoted() {
        let tag = StructTag::parse(r#"doc:"say \"hi\"" reset:"nonil""#);
        assert_eq!(tag.lookup("doc").as_deref(), Some(r#"say "hi""#));
        assert_eq!(tag.lookup("reset").as_deref(), Some("nonil"));
    }

    #[test]
    fn go_escapes_resolve_like_reflect() {
        for raw in [r#"reset:"\x6eonil""#, r#"reset:"\156onil""#, r#"reset:"\u006eonil""#, r#"reset:"\U0000006eonil""#] {
            assert_eq!(StructTag::parse(raw).lookup("reset").as_deref(), Some("nonil"), "{raw}");
            assert_eq!(ResetPolicy::from_tag(Some(raw)), ResetPolicy::NonNil, "{raw}");
        }
        let tag = StructTag::parse(r#"doc:"\a\b\f\v\t""#);
        assert_eq!(tag.lookup("doc").as_deref(), Some("\u{7}\u{8}\u{c}\u{b}\t"));
    }

    #[test]
    fn invalid_escapes_hide_the_value() {
        // `\'` is only valid inside rune literals; octal tops out at \377
        assert_eq!(StructTag::parse(r#"reset:"\'nonil""#).lookup("reset"), None);
        assert_eq!(StructTag::parse(r#"reset:"\400""#).lookup("reset"), None);
        assert_eq!(StructTag::parse(r#"reset:"\x6""#).lookup("reset"), None);
        assert_eq!(StructTag::parse(r#"reset:"\uD800""#).lookup("reset"), None);
    }

    #[test]
    fn policy_is_nonil_only_for_exact_value() {
        assert_eq!(ResetPolicy::from_tag(Some(r#"reset:"nonil""#)), ResetPolicy::NonNil);
        assert_eq!(ResetPolicy::from_tag(Some(r#"reset:"NONIL""#)), ResetPolicy::Nilable);
        assert_eq!(ResetPolicy::from_tag(Some(r#"reset:"nonil,x""#)), ResetPolicy::Nilable);
        assert_eq!(ResetPolicy::from_tag(Some(r#"json:"a""#)), ResetPolicy::Nilable);
        assert_eq!(ResetPolicy::from_tag(None), ResetPolicy::Nilable);
    }

    #[test]
    fn embedded_fields_are_skipped_and_unresolved_are_recorded() {
        let fields = vec![
            FieldDecl::new("A", TypeDescriptor::basic("int")),
            FieldDecl { name: None, ty: Some(TypeDescriptor::basic("int")), tag: None },
            FieldDecl { name: Some("X".into()), ty: None, tag: None },
            FieldDecl::new("B", TypeDescriptor::slice(TypeDescriptor::basic("int"))).with_tag(r#"reset:"nonil""#),
        ];
        let scanned = scan_fields(&fields);

        assert_eq!(scanned.len(), 3);
        assert!(matches!(&scanned[0], ScannedField::Reset(s) if s.name == "A" && s.policy == ResetPolicy::Nilable));
        assert_eq!(scanned[1], ScannedField::Omitted(Omission { field: "X", reason: FieldOmitted::Unresolved }));
        assert!(matches!(&scanned[2], ScannedField::Reset(s) if s.name == "B" && s.policy == ResetPolicy::NonNil));
    }
}
