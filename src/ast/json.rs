//! JSON hand-off format between the parser and the core.
//!
//! ```json
//! { "kind": "IntLiteral", "attributes": { "value": "3" }, "children": [], "line": 4, "column": 9 }
//! ```
//!
//! Attribute values may be strings, booleans or integers; they are stored as
//! strings inside the arena.

use super::{Ast, AstBuilder, AstError, Location, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonAttr {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl JsonAttr {
    fn into_string(self) -> String {
        match self {
            JsonAttr::Bool(b) => b.to_string(),
            JsonAttr::Int(i) => i.to_string(),
            JsonAttr::Str(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonNode {
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, JsonAttr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<JsonNode>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl Ast {
    /// Load a tree from its JSON form
    pub fn from_json(text: &str) -> crate::Result<Ast> {
        let root: JsonNode = serde_json::from_str(text)?;
        let mut builder = AstBuilder::new();
        let root_id = build_node(&mut builder, root)?;
        Ok(builder.finish(root_id))
    }

    /// Serialize the tree reachable from the root
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_json_node(self.root()))?)
    }

    fn to_json_node(&self, id: NodeId) -> JsonNode {
        let node = self.node(id);
        JsonNode {
            kind: node.kind.as_str().to_string(),
            attributes: node
                .attrs
                .iter()
                .map(|(k, v)| (k.clone(), JsonAttr::Str(v.clone())))
                .collect(),
            children: node.children.iter().map(|c| self.to_json_node(*c)).collect(),
            line: node.location.line,
            column: node.location.column,
        }
    }
}

fn build_node(builder: &mut AstBuilder, json: JsonNode) -> Result<NodeId, AstError> {
    let kind: NodeKind = json.kind.parse().map_err(AstError::UnknownKind)?;
    let mut children = Vec::with_capacity(json.children.len());
    for child in json.children {
        children.push(build_node(builder, child)?);
    }
    let attrs: Vec<(String, String)> = json
        .attributes
        .into_iter()
        .map(|(k, v)| (k, v.into_string()))
        .collect();
    let attr_refs: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    Ok(builder.raw(kind, Location::new(json.line, json.column), &attr_refs, children))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"{
        "kind": "Program",
        "children": [
            { "kind": "ImportDecl", "attributes": { "name": "io" }, "line": 1, "column": 1 },
            { "kind": "ClassDecl", "attributes": { "name": "A" }, "line": 2, "column": 1,
              "children": [
                { "kind": "MethodDecl", "attributes": { "name": "f", "isStatic": false }, "line": 3, "column": 5,
                  "children": [
                    { "kind": "Type", "attributes": { "name": "int", "isArray": false } },
                    { "kind": "Return", "line": 4, "children": [
                        { "kind": "IntLiteral", "attributes": { "value": 7 }, "line": 4, "column": 16 }
                    ] }
                  ] }
              ] }
        ]
    }"#;

    #[test]
    fn loads_nested_tree_with_mixed_attribute_types() {
        let ast = Ast::from_json(SMALL).unwrap();
        let class = ast.class_decl().unwrap();
        assert_eq!(ast.attr(class, "name"), Some("A"));
        let method = ast.first_child_of_kind(class, NodeKind::MethodDecl).unwrap();
        assert_eq!(ast.attr(method, "isStatic"), Some("false"));
        let ret = ast.first_child_of_kind(method, NodeKind::Return).unwrap();
        let lit = ast.child(ret, 0).unwrap();
        assert_eq!(ast.attr(lit, "value"), Some("7"));
        assert_eq!(ast.location(lit), Location::new(4, 16));
        assert_eq!(ast.parent(lit), Some(ret));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = Ast::from_json(r#"{ "kind": "Lambda" }"#).unwrap_err();
        assert!(err.to_string().contains("unknown node kind 'Lambda'"), "{err}");
    }

    #[test]
    fn json_survives_a_round_trip() {
        let ast = Ast::from_json(SMALL).unwrap();
        let again = Ast::from_json(&ast.to_json().unwrap()).unwrap();
        assert_eq!(ast.to_json().unwrap(), again.to_json().unwrap());
    }
}
