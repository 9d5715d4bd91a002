use pretty_assertions::assert_eq;
use sharpbind_decl::DeclGraph;

const DUMP: &str = r#"{
  "declarations": [
    { "kind": "class", "name": "Vec", "namespace": "geo",
      "members": [
        { "kind": "operator", "name": "operator-",
          "result": { "kind": "named", "name": "geo::Vec" } },
        { "kind": "operator", "name": "-",
          "result": { "kind": "named", "name": "geo::Vec" },
          "params": [ { "kind": "reference",
                        "type": { "kind": "named", "name": "geo::Vec", "const": true } } ] },
        { "kind": "method", "name": "scale", "params": [ { "kind": "fundamental", "name": "double" } ] }
      ] },
    { "kind": "function", "name": "Add",
      "result": { "kind": "fundamental", "name": "int" },
      "params": [ { "kind": "fundamental", "name": "int" },
                  { "kind": "fundamental", "name": "int" } ] },
    { "kind": "function", "name": "Add",
      "result": { "kind": "fundamental", "name": "int" },
      "params": [ { "kind": "fundamental", "name": "int" },
                  { "kind": "fundamental", "name": "int" },
                  { "kind": "fundamental", "name": "int" } ] }
  ]
}"#;

#[test]
fn test_overloads_from_a_dump() {
    let graph = DeclGraph::from_json_str(DUMP).unwrap();
    let adds = graph.lookup_all("Add").unwrap();
    assert_eq!(adds.len(), 2);

    let ids: Vec<String> = adds.iter().map(|&id| graph.get(id).id()).collect();
    assert_eq!(ids, ["Add__int_int", "Add__int_int_int"]);
    for &id in adds {
        assert!(!graph.get(id).is_unique);
    }
    assert_eq!(
        graph.get(adds[0]).pointer_declaration(false),
        "(int (*)(int, int))&Add"
    );
}

#[test]
fn test_unary_and_binary_operators_differ() {
    let graph = DeclGraph::from_json_str(DUMP).unwrap();
    let minus = graph.lookup_all("geo::Vec::operator-").unwrap();
    let ids: Vec<String> = minus.iter().map(|&id| graph.get(id).id()).collect();
    assert_eq!(ids[0], "geo_Vec_operator_negate");
    assert!(ids[1].starts_with("geo_Vec_operator_subtract__"));

    let scale = graph.get(graph.lookup("geo::Vec::scale").unwrap());
    assert!(scale.is_unique);
    assert_eq!(scale.pointer_declaration(false), "&geo::Vec::scale");
}

#[test]
fn test_unknown_operator_is_rejected() {
    let dump = r#"{ "declarations": [
        { "kind": "operator", "name": "operator<=>",
          "params": [ { "kind": "fundamental", "name": "int" } ] } ] }"#;
    let err = DeclGraph::from_json_str(dump).unwrap_err();
    assert_eq!(err.to_string(), "unknown operator `operator<=>`");
}
