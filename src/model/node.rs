//! Node in the diagram.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Bounds, Point, PropertyMap, Size};
use crate::{Error, Result};

/// Outline drawn for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    #[default]
    Rect,
    Circle,
    Capsule,
    Diamond,
}

impl NodeShape {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rect" => Some(NodeShape::Rect),
            "circle" => Some(NodeShape::Circle),
            "capsule" => Some(NodeShape::Capsule),
            "diamond" => Some(NodeShape::Diamond),
            _ => None,
        }
    }
}

/// A node in the diagram.
///
/// `x`/`y` is the centre of the box. Geometry is owned by the layout engine
/// while it runs and copied back on every tick; only the centre is accepted on
/// input so callers can seed a position.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub hash: String,
    #[serde(default, skip_serializing)]
    pub x: f64,
    #[serde(default, skip_serializing)]
    pub y: f64,
    /// Explicit size. Zero means "measure from the label".
    #[serde(default, skip_serializing)]
    pub width: f64,
    #[serde(default, skip_serializing)]
    pub height: f64,
    #[serde(skip)]
    pub bounds: Bounds,
    /// Id of the owning group. Never an ownership edge.
    #[serde(skip)]
    pub parent: Option<String>,
    #[serde(skip)]
    pub fixed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default)]
    pub node_shape: NodeShape,
    /// Explicit width/height were supplied and must survive measuring.
    #[serde(skip)]
    pub sized: bool,
    #[serde(flatten)]
    pub properties: PropertyMap,
}

impl Node {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into(), ..Self::default() }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self.bounds = Bounds::centered(self.center(), self.size());
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self.sized = true;
        self.bounds = Bounds::centered(self.center(), self.size());
        self
    }

    pub fn with_shortname(mut self, name: impl Into<String>) -> Self {
        self.shortname = Some(name.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Text used to measure and label the node.
    pub fn label(&self) -> &str {
        self.shortname.as_deref().unwrap_or(&self.hash)
    }

    /// Move the centre and keep `bounds` in step.
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        self.refresh_bounds();
    }

    pub fn refresh_bounds(&mut self) {
        self.bounds = Bounds::centered(self.center(), self.size());
    }

    pub fn validate(&self) -> Result<()> {
        if self.hash.trim().is_empty() {
            return Err(Error::Validation("node is missing a hash".into()));
        }
        Ok(())
    }

    /// Set one property by its wire name. Known fields are type-checked;
    /// anything else lands in `properties`. Returns whether geometry changed.
    pub fn set_property(&mut self, name: &str, value: Value) -> Result<bool> {
        match name {
            "hash" | "id" => {
                return Err(Error::Validation(format!("node property '{name}' is read-only")));
            }
            "shortname" => self.shortname = optional_string(name, value)?,
            "color" => self.color = optional_string(name, value)?,
            "class" => self.class = optional_string(name, value)?,
            "nodeShape" => {
                let raw = optional_string(name, value)?;
                self.node_shape = match raw {
                    None => NodeShape::default(),
                    Some(s) => NodeShape::parse(&s)
                        .ok_or_else(|| Error::Validation(format!("unknown node shape '{s}'")))?,
                };
            }
            "fixed" => {
                self.fixed = value
                    .as_bool()
                    .ok_or_else(|| type_error(name, "boolean", &value))?;
            }
            "x" | "y" | "width" | "height" => {
                let v = value.as_f64().ok_or_else(|| type_error(name, "number", &value))?;
                match name {
                    "x" => self.x = v,
                    "y" => self.y = v,
                    "width" => {
                        self.width = v;
                        self.sized = true;
                    }
                    _ => {
                        self.height = v;
                        self.sized = true;
                    }
                }
                self.refresh_bounds();
                return Ok(true);
            }
            _ => {
                self.properties.insert(name.to_string(), value);
            }
        }
        Ok(false)
    }
}

fn optional_string(name: &str, value: Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Err(type_error(name, "string", &other)),
    }
}

fn type_error(name: &str, expected: &str, got: &Value) -> Error {
    Error::Validation(format!("node property '{name}' expects a {expected}, got {got}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_requires_hash() {
        assert!(Node::new("a").validate().is_ok());
        assert!(matches!(Node::new("  ").validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_set_property_typed_fields() {
        let mut n = Node::new("a");
        assert!(!n.set_property("color", json!("red")).unwrap());
        assert_eq!(n.color.as_deref(), Some("red"));

        assert!(n.set_property("x", json!(12.5)).unwrap());
        assert_eq!(n.x, 12.5);

        n.set_property("nodeShape", json!("circle")).unwrap();
        assert_eq!(n.node_shape, NodeShape::Circle);

        n.set_property("weight", json!(3)).unwrap();
        assert_eq!(n.properties.get("weight"), Some(&json!(3)));
    }

    #[test]
    fn test_set_property_rejects_wrong_type() {
        let mut n = Node::new("a");
        assert!(matches!(n.set_property("fixed", json!("yes")), Err(Error::Validation(_))));
        assert!(matches!(n.set_property("color", json!(1)), Err(Error::Validation(_))));
        assert!(matches!(n.set_property("hash", json!("b")), Err(Error::Validation(_))));
    }

    #[test]
    fn test_serde_skips_runtime_geometry() {
        let n = Node::new("a").at(5.0, 6.0).with_shortname("A").with_property("k", 1);
        let v = serde_json::to_value(&n).unwrap();
        assert_eq!(v, json!({"hash": "a", "shortname": "A", "nodeShape": "rect", "k": 1}));

        let back: Node = serde_json::from_value(json!({"hash": "b", "x": 3.0, "color": "blue"})).unwrap();
        assert_eq!(back.x, 3.0);
        assert_eq!(back.color.as_deref(), Some("blue"));
        assert!(back.properties.is_empty());
    }
}
