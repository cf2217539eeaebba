use reset_gen::{generate, path_de, Error, ResolvedPackage};
use serde_json::{json, Value};

fn basic(name: &str) -> Value {
    json!({ "kind": "basic", "name": name })
}

fn named(path: &str, name: &str, underlying: Value) -> Value {
    json!({ "kind": "named", "path": path, "name": name, "underlying": underlying })
}

fn ptr(elem: Value) -> Value {
    json!({ "kind": "pointer", "elem": elem })
}

fn strukt() -> Value {
    json!({ "kind": "struct" })
}

fn field(name: &str, ty: Value) -> Value {
    json!({ "name": name, "type": ty })
}

fn nonil(name: &str, ty: Value) -> Value {
    json!({ "name": name, "type": ty, "tag": "`json:\"-\" reset:\"nonil\"`" })
}

fn package(types: Value) -> ResolvedPackage {
    path_de::package_from_value(json!({
        "path": "example.com/shop",
        "name": "shop",
        "types": types,
    }))
    .unwrap()
}

fn decl(name: &str, fields: Vec<Value>) -> Value {
    json!({ "name": name, "underlying": { "kind": "struct", "fields": fields } })
}

#[test]
fn full_file_with_imports_and_every_category() {
    let item = named("example.com/shop/model", "Item", strukt());
    let user = named("example.com/shop/model", "User", strukt());
    let time = named("time", "Time", strukt());
    let tags = named("example.com/shop", "Tags", json!({ "kind": "slice", "elem": basic("string") }));

    let pkg = package(json!([
        decl("Cart", vec![
            json!({ "type": named("sync", "Mutex", strukt()) }),
            nonil("Items", json!({ "kind": "slice", "elem": ptr(item) })),
            nonil("Index", json!({ "kind": "map", "key": basic("string"), "elem": basic("int") })),
            nonil("Owner", ptr(user)),
            field("Count", basic("int")),
            field("Note", basic("string")),
            field("Ratio", basic("float64")),
            field("Slots", json!({ "kind": "array", "elem": basic("int"), "len": 4 })),
            field("Updates", json!({ "kind": "chan", "elem": basic("int") })),
            nonil("Deadline", ptr(time.clone())),
            field("Created", ptr(time)),
            nonil("Tags", tags),
        ]),
        { "name": "Status", "underlying": basic("int") },
        decl("Counter", vec![
            nonil("N", ptr(basic("int"))),
            field("M", ptr(basic("int"))),
        ]),
    ]));

    let src = generate(&pkg, &[]).unwrap();
    let expected = "\
// Code generated by reset-gen. DO NOT EDIT.
package shop

import (
\t\"example.com/shop/model\"
\t\"time\"
)

func (C *Cart) Reset() {
\tC.Items = make([]*model.Item, 0)
\tC.Index = make(map[string]int)
\tC.Owner = &model.User{}
\tC.Count = 0
\tC.Note = \"\"
\tC.Slots = [4]int{}
\tC.Updates = nil
\tC.Deadline = &time.Time{}
\tC.Created = nil
\tC.Tags = make(Tags, 0)
}

func (C *Counter) Reset() {
\tC.N = new(int)
\tC.M = nil
}
";
    assert_eq!(src, expected);
}

#[test]
fn scenario_a_and_b_through_the_document_boundary() {
    let pkg = package(json!([
        decl("Plain", vec![
            field("A", basic("int")),
            json!({ "name": "X" }),
            field("B", basic("string")),
        ]),
    ]));
    let src = generate(&pkg, &[]).unwrap();
    assert!(src.ends_with("func (P *Plain) Reset() {\n\tP.A = 0\n\tP.B = \"\"\n}\n"), "{src}");
    assert!(!src.contains("import"));
}

#[test]
fn scenario_d_one_bad_struct_fails_the_batch() {
    let pkg = package(json!([
        decl("Good", vec![field("A", basic("int"))]),
        decl("Bad", vec![field("Where", named("example.com/shop/geo", "Point", strukt()))]),
    ]));
    match generate(&pkg, &[]) {
        Err(Error::UnsupportedType { struct_name, field, category }) => {
            assert_eq!(struct_name, "Bad");
            assert_eq!(field, "Where");
            assert_eq!(category, "struct");
        }
        other => panic!("expected UnsupportedType, got {other:?}"),
    }

    // selecting only the good struct succeeds
    let src = generate(&pkg, &["Good".to_string()]).unwrap();
    assert!(src.contains("func (G *Good) Reset()"));
}

#[test]
fn nonil_container_of_interface_is_unsupported() {
    let pkg = package(json!([
        decl("Bag", vec![
            field("Loose", json!({ "kind": "map", "key": basic("string"), "elem": { "kind": "interface" } })),
            nonil("Strict", json!({ "kind": "map", "key": basic("string"), "elem": { "kind": "interface" } })),
        ]),
    ]));
    assert!(matches!(
        generate(&pkg, &[]),
        Err(Error::UnsupportedType { ref field, category: "interface", .. }) if field == "Strict"
    ));
}
