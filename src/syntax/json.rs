// ==============================================================================
// JSON Export
// ==============================================================================
//
// A machine-readable dump of a tree for editor tooling and snapshot tests:
//
//   { "source": "<input>", "root": { "kind": "program", ... }, "errors": [...] }
//
// Every node carries `kind` (its query name), `named`, `start`, `end`, and
// `field` when its edge is labelled. Leaves carry `text`; interior nodes carry
// `children`. Key order is fixed (serde_json's `preserve_order`).

use serde_json::{Map, Value};

use super::{Node, SyntaxError, SyntaxTree};

pub fn tree_to_json(tree: &SyntaxTree) -> Value {
    let mut obj = Map::new();
    obj.insert("source".to_string(), Value::String(tree.name().to_string()));
    obj.insert("root".to_string(), node_to_json(tree.root()));
    obj.insert(
        "errors".to_string(),
        Value::Array(tree.errors().iter().map(error_to_json).collect()),
    );
    Value::Object(obj)
}

pub fn node_to_json(node: Node<'_>) -> Value {
    let mut obj = Map::new();
    obj.insert("kind".to_string(), Value::String(node.kind_name().to_string()));
    obj.insert("named".to_string(), Value::Bool(node.is_named()));
    obj.insert("start".to_string(), Value::from(node.span().start));
    obj.insert("end".to_string(), Value::from(node.span().end));
    if let Some(field) = node.field_name() {
        obj.insert("field".to_string(), Value::String(field.as_str().to_string()));
    }
    if node.child_count() == 0 {
        obj.insert("text".to_string(), Value::String(node.text().to_string()));
    } else {
        obj.insert(
            "children".to_string(),
            Value::Array(node.children().map(node_to_json).collect()),
        );
    }
    Value::Object(obj)
}

fn error_to_json(error: &SyntaxError) -> Value {
    let mut obj = Map::new();
    obj.insert("code".to_string(), Value::String(error.kind.code().to_string()));
    obj.insert("message".to_string(), Value::String(error.message.clone()));
    if let Some(help) = &error.help {
        obj.insert("help".to_string(), Value::String(help.clone()));
    }
    obj.insert("start".to_string(), Value::from(error.span.start));
    obj.insert("end".to_string(), Value::from(error.span.end));
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use serde_json::json;

    #[test]
    fn leaf_and_interior_shapes() {
        let tree = parse("fixed F;").unwrap();
        assert_eq!(
            tree.to_json(),
            json!({
                "source": "<input>",
                "root": {
                    "kind": "program", "named": true, "start": 0, "end": 8,
                    "children": [{
                        "kind": "fixed_declaration", "named": true, "start": 0, "end": 8,
                        "children": [
                            { "kind": "fixed", "named": false, "start": 0, "end": 5, "text": "fixed" },
                            { "kind": "identifier", "named": true, "start": 6, "end": 7, "text": "F" },
                            { "kind": ";", "named": false, "start": 7, "end": 8, "text": ";" },
                        ]
                    }]
                },
                "errors": []
            })
        );
    }

    #[test]
    fn key_order_is_stable() {
        let tree = parse("record R { int x; }").unwrap();
        let text = serde_json::to_string(&tree.to_json()).unwrap();
        assert!(text.starts_with(r#"{"source":"<input>","root":{"kind":"program","named":true"#));
        assert!(text.contains(
            r#"{"kind":"primitive_type","named":true,"start":11,"end":14,"field":"type","children":[{"kind":"int","named":false"#
        ));
    }

    #[test]
    fn errors_are_listed() {
        let tree = parse("record { }").unwrap();
        let value = tree.to_json();
        let errors = value["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["code"], "avdl::syntax");
        assert_eq!(errors[0]["start"], errors[0]["end"]);
    }
}
