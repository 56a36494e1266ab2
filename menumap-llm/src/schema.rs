//! Bounded-depth response schema construction.
//!
//! Gemini's `responseSchema` has no way to express "a menu entry whose
//! children are menu entries" recursively, so the nesting is unrolled to a
//! fixed maximum depth: the deepest level is built first, then each
//! enclosing level embeds the previously built one as the item type of its
//! `children` array. The deepest level carries no `children` field at all.
//!
//! Every level owns its own `required` list. Levels 1..D-1 require
//! `children` while level D must not, so a shared list would silently
//! corrupt sibling levels the moment one of them is extended.

use serde::Serialize;
use std::collections::BTreeMap;

/// Default nesting bound for menu schemas.
pub const MAX_MENU_DEPTH: usize = 6;

/// Value type of a schema node, in the spelling the Gemini REST API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    String,
    Object,
    Array,
}

/// One node of a response schema.
///
/// Serializes to the OpenAPI-subset shape Gemini accepts; empty maps and
/// lists are omitted so a string field renders as just `{"type": "STRING"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaNode {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl SchemaNode {
    fn string(description: &str) -> Self {
        Self {
            kind: SchemaType::String,
            description: Some(description.to_string()),
            properties: BTreeMap::new(),
            items: None,
            required: Vec::new(),
        }
    }

    fn array(items: SchemaNode, description: &str) -> Self {
        Self {
            kind: SchemaType::Array,
            description: Some(description.to_string()),
            properties: BTreeMap::new(),
            items: Some(Box::new(items)),
            required: Vec::new(),
        }
    }

    fn object(properties: BTreeMap<String, SchemaNode>, required: Vec<String>) -> Self {
        Self {
            kind: SchemaType::Object,
            description: None,
            properties,
            items: None,
            required,
        }
    }
}

/// Human-readable label for the `children` array that holds entries at
/// `depth`.
pub fn depth_description(depth: usize) -> String {
    format!("Menu entries at depth {depth}")
}

/// Build the schema for a single menu-entry level.
///
/// With `child` present, the level gains a `children` array of that child
/// schema and `children` joins the required list; without it the field is
/// omitted entirely, which is how the terminal depth is expressed.
pub fn item_schema(child: Option<SchemaNode>, depth_desc: &str) -> SchemaNode {
    let mut properties = BTreeMap::new();
    properties.insert(
        "text".to_string(),
        SchemaNode::string("Visible label of the menu entry"),
    );
    properties.insert(
        "href".to_string(),
        SchemaNode::string("Link target of the menu entry"),
    );

    // Each level gets a freshly constructed required list; levels must never
    // share one.
    let mut required = vec!["text".to_string(), "href".to_string()];

    if let Some(child) = child {
        properties.insert("children".to_string(), SchemaNode::array(child, depth_desc));
        required.push("children".to_string());
    }

    SchemaNode::object(properties, required)
}

/// Build the full menu response schema for `depth` nesting levels.
///
/// Construction runs bottom-up: the deepest item level is built first (no
/// `children`), each enclosing level wraps the one below it, and the
/// top-level object holds level 1 as an array under a required `menu`
/// field. A `depth` of zero is treated as one. Pure; cannot fail.
pub fn menu_schema(depth: usize) -> SchemaNode {
    let depth = depth.max(1);

    let mut item = item_schema(None, "");
    for level in (2..=depth).rev() {
        item = item_schema(Some(item), &depth_description(level));
    }

    let mut properties = BTreeMap::new();
    properties.insert(
        "menu".to_string(),
        SchemaNode::array(item, "Top-level menu entries (depth 1)"),
    );

    SchemaNode::object(properties, vec!["menu".to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walk from the root schema down to the item schema at level `k`
    /// (1-based).
    fn level(root: &SchemaNode, k: usize) -> &SchemaNode {
        let mut node = root.properties["menu"].items.as_deref().unwrap();
        for _ in 1..k {
            node = node.properties["children"].items.as_deref().unwrap();
        }
        node
    }

    fn level_mut(root: &mut SchemaNode, k: usize) -> &mut SchemaNode {
        let mut node = root
            .properties
            .get_mut("menu")
            .unwrap()
            .items
            .as_deref_mut()
            .unwrap();
        for _ in 1..k {
            node = node
                .properties
                .get_mut("children")
                .unwrap()
                .items
                .as_deref_mut()
                .unwrap();
        }
        node
    }

    /// Independently build the item schema covering levels `k..=depth`.
    fn independent_level(k: usize, depth: usize) -> SchemaNode {
        let mut item = item_schema(None, "");
        for lvl in (k + 1..=depth).rev() {
            item = item_schema(Some(item), &depth_description(lvl));
        }
        item
    }

    #[test]
    fn each_level_embeds_the_next() {
        let root = menu_schema(MAX_MENU_DEPTH);
        for k in 1..MAX_MENU_DEPTH {
            let embedded = level(&root, k).properties["children"]
                .items
                .as_deref()
                .unwrap();
            assert_eq!(
                *embedded,
                independent_level(k + 1, MAX_MENU_DEPTH),
                "level {k} does not embed level {}",
                k + 1
            );
        }
    }

    #[test]
    fn deepest_level_has_no_children() {
        let root = menu_schema(MAX_MENU_DEPTH);
        let deepest = level(&root, MAX_MENU_DEPTH);
        assert!(!deepest.properties.contains_key("children"));
        assert_eq!(deepest.required, vec!["text", "href"]);
    }

    #[test]
    fn intermediate_levels_require_children() {
        let root = menu_schema(MAX_MENU_DEPTH);
        for k in 1..MAX_MENU_DEPTH {
            assert_eq!(level(&root, k).required, vec!["text", "href", "children"]);
        }
    }

    #[test]
    fn root_requires_exactly_menu() {
        for depth in 1..=MAX_MENU_DEPTH {
            let root = menu_schema(depth);
            assert_eq!(root.required, vec!["menu"]);
        }
    }

    #[test]
    fn required_lists_do_not_alias() {
        let mut root = menu_schema(MAX_MENU_DEPTH);
        let before: Vec<Vec<String>> = (1..=MAX_MENU_DEPTH)
            .map(|k| level(&root, k).required.clone())
            .collect();

        level_mut(&mut root, 2).required.push("poison".to_string());

        for (idx, k) in (1..=MAX_MENU_DEPTH).enumerate() {
            if k == 2 {
                continue;
            }
            assert_eq!(
                level(&root, k).required,
                before[idx],
                "mutating level 2 changed level {k}"
            );
        }
    }

    #[test]
    fn depth_two_worked_example() {
        let root = menu_schema(2);
        let v = serde_json::to_value(&root).unwrap();

        assert_eq!(v["required"], serde_json::json!(["menu"]));
        assert_eq!(
            v["properties"]["menu"]["items"]["required"],
            serde_json::json!(["text", "href", "children"])
        );
        let inner = &v["properties"]["menu"]["items"]["properties"]["children"]["items"];
        assert_eq!(inner["required"], serde_json::json!(["text", "href"]));
        assert_eq!(inner["properties"]["text"]["type"], "STRING");
        assert_eq!(inner["properties"]["href"]["type"], "STRING");
        assert!(inner["properties"].get("children").is_none());
    }

    #[test]
    fn depth_one_is_a_flat_menu() {
        let root = menu_schema(1);
        let item = level(&root, 1);
        assert!(!item.properties.contains_key("children"));
        assert_eq!(item.required, vec!["text", "href"]);
    }

    #[test]
    fn depth_zero_is_clamped_to_one() {
        assert_eq!(menu_schema(0), menu_schema(1));
    }

    #[test]
    fn string_fields_serialize_without_empty_collections() {
        let v = serde_json::to_value(SchemaNode::string("label")).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"type": "STRING", "description": "label"})
        );
    }
}
