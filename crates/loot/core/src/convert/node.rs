//! Declarative node model and shape helpers.
//!
//! Nodes are [`serde_json::Value`] trees: scalars, ordered lists, and maps
//! from string keys to nodes. Any format that deserializes into a `Value`
//! (JSON, RON, TOML) can feed the registries.
//!
//! The `require_*` helpers read an optional child and fail with a labelled
//! error, so converters never see a missing field as a null pointer.

use super::ConversionError;

/// A declarative node.
pub type Node = serde_json::Value;

/// The map variant of a [`Node`].
pub type NodeMap = serde_json::Map<String, Node>;

/// Structural kind of a node, for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    Null,
    Boolean,
    Number,
    String,
    List,
    Map,
}

pub fn kind_of(node: &Node) -> NodeKind {
    match node {
        Node::Null => NodeKind::Null,
        Node::Bool(_) => NodeKind::Boolean,
        Node::Number(_) => NodeKind::Number,
        Node::String(_) => NodeKind::String,
        Node::Array(_) => NodeKind::List,
        Node::Object(_) => NodeKind::Map,
    }
}

/// Absent and null children are both "missing".
fn present<'n>(node: Option<&'n Node>, label: &str) -> Result<&'n Node, ConversionError> {
    match node {
        Some(node) if !node.is_null() => Ok(node),
        _ => Err(ConversionError::MissingField {
            field: label.to_owned(),
        }),
    }
}

fn mismatch(label: &str, expected: &'static str, node: &Node) -> ConversionError {
    ConversionError::ShapeMismatch {
        label: label.to_owned(),
        expected,
        found: kind_of(node),
    }
}

pub fn require_map<'n>(node: Option<&'n Node>, label: &str) -> Result<&'n NodeMap, ConversionError> {
    let node = present(node, label)?;
    node.as_object().ok_or_else(|| mismatch(label, "map", node))
}

pub fn require_list<'n>(
    node: Option<&'n Node>,
    label: &str,
) -> Result<&'n Vec<Node>, ConversionError> {
    let node = present(node, label)?;
    node.as_array().ok_or_else(|| mismatch(label, "list", node))
}

pub fn require_str<'n>(node: Option<&'n Node>, label: &str) -> Result<&'n str, ConversionError> {
    let node = present(node, label)?;
    node.as_str().ok_or_else(|| mismatch(label, "string", node))
}

pub fn require_bool(node: Option<&Node>, label: &str) -> Result<bool, ConversionError> {
    let node = present(node, label)?;
    node.as_bool().ok_or_else(|| mismatch(label, "boolean", node))
}

pub fn require_f64(node: Option<&Node>, label: &str) -> Result<f64, ConversionError> {
    let node = present(node, label)?;
    node.as_f64().ok_or_else(|| mismatch(label, "number", node))
}

pub fn require_i64(node: Option<&Node>, label: &str) -> Result<i64, ConversionError> {
    let node = present(node, label)?;
    node.as_i64().ok_or_else(|| mismatch(label, "integer", node))
}

pub fn require_u64(node: Option<&Node>, label: &str) -> Result<u64, ConversionError> {
    let node = present(node, label)?;
    node.as_u64()
        .ok_or_else(|| mismatch(label, "non-negative integer", node))
}

/// Reads a number that is `None` when absent or null.
pub fn optional_f64(node: Option<&Node>, label: &str) -> Result<Option<f64>, ConversionError> {
    match node {
        None | Some(Node::Null) => Ok(None),
        node => require_f64(node, label).map(Some),
    }
}

/// True when `node` holds a non-null value.
pub fn is_present(node: Option<&Node>) -> bool {
    node.is_some_and(|node| !node.is_null())
}

/// A field with a default that remembers whether the document spelled it out.
///
/// Writing it back reproduces the document: explicit values are always
/// written, implicit ones only when they differ from the default. Equality
/// compares values only.
#[derive(Clone, Copy, Debug)]
pub struct Defaulted<T> {
    value: T,
    default: T,
    explicit: bool,
}

impl<T: Copy + PartialEq> Defaulted<T> {
    /// The default itself, not spelled out.
    pub fn new(default: T) -> Self {
        Self {
            value: default,
            default,
            explicit: false,
        }
    }

    /// `value` in place of the default, written only if it differs.
    #[must_use]
    pub fn with(self, value: T) -> Self {
        Self {
            value,
            default: self.default,
            explicit: false,
        }
    }

    #[must_use]
    pub fn explicit(self, value: T) -> Self {
        Self {
            value,
            default: self.default,
            explicit: true,
        }
    }

    pub fn get(&self) -> T {
        self.value
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Whether writing this field back is needed to reproduce its source.
    pub fn is_written(&self) -> bool {
        self.explicit || self.value != self.default
    }

    /// Reads `node` with `read`, falling back to `default` when absent or null.
    pub fn read(
        node: Option<&Node>,
        default: T,
        read: impl FnOnce(Option<&Node>) -> Result<T, ConversionError>,
    ) -> Result<Self, ConversionError> {
        let field = Self::new(default);
        if is_present(node) {
            read(node).map(|value| field.explicit(value))
        } else {
            Ok(field)
        }
    }
}

impl<T: Copy + PartialEq + Into<Node>> Defaulted<T> {
    /// Inserts the value under `field` when [`is_written`](Self::is_written).
    pub fn write(&self, into: &mut NodeMap, field: &str) {
        if self.is_written() {
            into.insert(field.to_owned(), self.value.into());
        }
    }
}

impl<T: PartialEq> PartialEq for Defaulted<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for Defaulted<T> {}

/// Reads a boolean that defaults when absent or null, keeping its presence.
pub fn defaulted_bool(
    node: Option<&Node>,
    label: &str,
    default: bool,
) -> Result<Defaulted<bool>, ConversionError> {
    Defaulted::read(node, default, |node| require_bool(node, label))
}

/// Reads an integer that defaults when absent or null, keeping its presence.
pub fn defaulted_i64(
    node: Option<&Node>,
    label: &str,
    default: i64,
) -> Result<Defaulted<i64>, ConversionError> {
    Defaulted::read(node, default, |node| require_i64(node, label))
}

/// Structural equivalence of two nodes.
///
/// Maps compare regardless of key order and a null child equals an absent
/// one; numbers compare by value, so `3` and `3.0` are equivalent.
pub fn equivalent(left: &Node, right: &Node) -> bool {
    match (left, right) {
        (Node::Number(left), Node::Number(right)) => match (left.as_i64(), right.as_i64()) {
            (Some(left), Some(right)) => left == right,
            _ => left.as_f64() == right.as_f64(),
        },
        (Node::Array(left), Node::Array(right)) => {
            left.len() == right.len() && left.iter().zip(right).all(|(l, r)| equivalent(l, r))
        }
        (Node::Object(left), Node::Object(right)) => {
            let covers = |from: &NodeMap, to: &NodeMap| {
                from.iter()
                    .filter(|(_, value)| !value.is_null())
                    .all(|(key, value)| to.get(key).is_some_and(|other| equivalent(value, other)))
            };
            covers(left, right) && covers(right, left)
        }
        _ => left == right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_and_null_are_missing_fields() {
        let node = json!({ "present": 1, "null": null });
        let map = node.as_object().unwrap();

        assert_eq!(require_i64(map.get("present"), "present").unwrap(), 1);
        assert!(matches!(
            require_i64(map.get("absent"), "absent"),
            Err(ConversionError::MissingField { field }) if field == "absent"
        ));
        assert!(matches!(
            require_i64(map.get("null"), "null"),
            Err(ConversionError::MissingField { .. })
        ));
    }

    #[test]
    fn wrong_kind_is_a_shape_mismatch() {
        let node = json!("text");
        let err = require_map(Some(&node), "entries").unwrap_err();
        assert_eq!(
            err,
            ConversionError::ShapeMismatch {
                label: "entries".to_string(),
                expected: "map",
                found: NodeKind::String,
            }
        );
        assert_eq!(err.to_string(), "expected entries to be a map, found string");
    }

    #[test]
    fn optional_values_default() {
        assert!(defaulted_bool(None, "add", true).unwrap().get());
        assert_eq!(defaulted_i64(Some(&Node::Null), "weight", 1).unwrap().get(), 1);
        assert_eq!(optional_f64(Some(&json!(0.5)), "chance").unwrap(), Some(0.5));
        assert_eq!(optional_f64(None, "chance").unwrap(), None);
        assert!(defaulted_bool(Some(&json!(3)), "add", false).is_err());
    }

    #[test]
    fn kinds() {
        assert_eq!(kind_of(&json!([1])), NodeKind::List);
        assert_eq!(kind_of(&json!({})), NodeKind::Map);
        assert_eq!(NodeKind::Boolean.to_string(), "boolean");
    }

    #[test]
    fn defaulted_fields_remember_presence() {
        let absent = defaulted_bool(None, "add", false).unwrap();
        let spelled = defaulted_bool(Some(&json!(false)), "add", false).unwrap();
        assert_eq!(absent, spelled);
        assert!(!absent.is_written());
        assert!(spelled.is_written());

        let mut map = NodeMap::new();
        absent.write(&mut map, "add");
        assert!(map.is_empty());
        spelled.write(&mut map, "add");
        assert_eq!(Node::Object(map), json!({ "add": false }));

        let weight = Defaulted::new(1).with(4);
        assert!(weight.is_written() && !weight.is_explicit());
        assert_eq!(weight.get(), 4);
        assert!(defaulted_i64(Some(&json!("heavy")), "weight", 1).is_err());
    }

    #[test]
    fn equivalence_ignores_number_form_and_nulls() {
        assert!(equivalent(&json!({ "a": 3, "b": null }), &json!({ "a": 3.0 })));
        assert!(equivalent(&json!([1, { "x": true }]), &json!([1.0, { "x": true }])));
        assert!(!equivalent(&json!({ "a": 3 }), &json!({ "a": 3.5 })));
        assert!(!equivalent(&json!({ "a": 3 }), &json!({ "a": 3, "b": 1 })));
        assert!(!equivalent(&json!(-1), &json!(18446744073709551615u64)));
    }
}
