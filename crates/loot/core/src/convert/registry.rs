//! Per-category converter registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::{ConversionError, Converter, Convertible, Node, NodeMap, kind_of, node};
use crate::context::ConversionContext;
use crate::error::BuildError;

/// Fallback reader for nodes that carry no usable discriminator.
///
/// Returns `Ok(None)` to decline the node.
pub type DefaultDeserializer<L, V> = Arc<
    dyn Fn(&Node, &ConversionRegistry<L, V>, &ConversionContext<'_, L>) -> Result<Option<Arc<V>>, ConversionError>
        + Send
        + Sync,
>;

static NULL: Node = Node::Null;

/// Converters of one category, keyed by discriminator.
///
/// Registration takes `&mut self`; once built and shared, a registry is only
/// read, so concurrent lookups need no locking.
pub struct ConversionRegistry<L, V: ?Sized> {
    category: &'static str,
    element_name: String,
    converters: HashMap<String, Arc<dyn Converter<L, V>>>,
    default_deserializer: Option<DefaultDeserializer<L, V>>,
}

impl<L, V: ?Sized> ConversionRegistry<L, V> {
    pub fn builder(category: &'static str) -> ConversionRegistryBuilder<L, V> {
        ConversionRegistryBuilder {
            category,
            element_name: None,
            converters: Vec::new(),
            default_deserializer: None,
        }
    }

    /// Category label used in diagnostics (`"conditions"`, `"entries"`, ...).
    pub fn category(&self) -> &'static str {
        self.category
    }

    /// Name of the discriminator field.
    pub fn element_name(&self) -> &str {
        &self.element_name
    }

    /// Registers `converter` under `key`, returning the converter it replaced.
    ///
    /// Duplicate keys are not rejected: the last registration wins.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        converter: Arc<dyn Converter<L, V>>,
    ) -> Option<Arc<dyn Converter<L, V>>> {
        let key = key.into();
        debug!(
            category = self.category,
            key = %key,
            value_type = converter.value_type(),
            "registering converter"
        );
        let previous = self.converters.insert(key.clone(), converter);
        if let Some(previous) = &previous {
            warn!(
                category = self.category,
                key = %key,
                replaced = previous.value_type(),
                "converter key registered twice, keeping the latest"
            );
        }
        previous
    }

    /// Registers a converter under its own key.
    pub fn register_converter(
        &mut self,
        converter: impl Converter<L, V> + 'static,
    ) -> Option<Arc<dyn Converter<L, V>>> {
        let key = converter.key().to_owned();
        self.register(key, Arc::new(converter))
    }

    /// Returns true if a converter was removed.
    pub fn unregister(&mut self, key: &str) -> bool {
        self.converters.remove(key).is_some()
    }

    pub fn lookup(&self, key: &str) -> Option<&Arc<dyn Converter<L, V>>> {
        self.converters.get(key)
    }

    pub fn clear(&mut self) {
        self.converters.clear();
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn set_default_deserializer(&mut self, deserializer: DefaultDeserializer<L, V>) {
        self.default_deserializer = Some(deserializer);
    }

    pub fn has_default_deserializer(&self) -> bool {
        self.default_deserializer.is_some()
    }

    /// Reads a value from `node`, which is labelled `label` in diagnostics.
    ///
    /// Resolution order:
    /// 1. a map whose discriminator is a string dispatches to the converter
    ///    registered for it, failing with [`ConversionError::NoConverter`]
    ///    when there is none;
    /// 2. anything else goes to the default deserializer, if configured;
    /// 3. otherwise [`ConversionError::ExpectedValue`].
    pub fn deserialize(
        &self,
        node: Option<&Node>,
        label: &str,
        ctx: &ConversionContext<'_, L>,
    ) -> Result<Arc<V>, ConversionError> {
        let node = node.unwrap_or(&NULL);

        if let Some(key) = node
            .as_object()
            .and_then(|map| map.get(&self.element_name))
            .and_then(Node::as_str)
        {
            trace!(category = self.category, key, label, "dispatching by discriminator");
            let converter = self
                .lookup(key)
                .ok_or_else(|| ConversionError::NoConverter {
                    category: self.category,
                    key: key.to_owned(),
                })?;
            return converter.deserialize(node, ctx);
        }

        if let Some(default) = &self.default_deserializer {
            trace!(category = self.category, label, "trying default deserializer");
            if let Some(value) = default(node, self, ctx)? {
                return Ok(value);
            }
        }

        Err(ConversionError::ExpectedValue {
            category: self.category,
            label: label.to_owned(),
            found: kind_of(node),
        })
    }

    /// Reads a list of values. An absent or null node is an empty list.
    ///
    /// Errors are located as `label[index]`.
    pub fn deserialize_list(
        &self,
        node: Option<&Node>,
        label: &str,
        ctx: &ConversionContext<'_, L>,
    ) -> Result<Vec<Arc<V>>, ConversionError> {
        if node.is_none_or(Node::is_null) {
            return Ok(Vec::new());
        }
        node::require_list(node, label)?
            .iter()
            .enumerate()
            .map(|(index, element)| {
                let label = format!("{label}[{index}]");
                self.deserialize(Some(element), &label, ctx)
                    .map_err(|err| err.at(label))
            })
            .collect()
    }
}

impl<L, V: ?Sized + Convertible<L>> ConversionRegistry<L, V> {
    /// Writes `value` into a fresh map node.
    ///
    /// The discriminator comes from the value's own converter, which then
    /// fills in the payload. The value does not have to be registered here.
    pub fn serialize(
        &self,
        value: &V,
        ctx: &ConversionContext<'_, L>,
    ) -> Result<Node, ConversionError> {
        let converter = value.own_converter();
        let mut map = NodeMap::new();
        map.insert(
            self.element_name.clone(),
            Node::String(converter.key().to_owned()),
        );
        converter.serialize(value, &mut map, ctx)?;
        Ok(Node::Object(map))
    }

    pub fn serialize_list(
        &self,
        values: &[Arc<V>],
        ctx: &ConversionContext<'_, L>,
    ) -> Result<Node, ConversionError> {
        values
            .iter()
            .map(|value| self.serialize(value, ctx))
            .collect::<Result<Vec<_>, _>>()
            .map(Node::Array)
    }
}

impl<L, V: ?Sized> fmt::Debug for ConversionRegistry<L, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionRegistry")
            .field("category", &self.category)
            .field("element_name", &self.element_name)
            .field("keys", &self.keys())
            .field("default_deserializer", &self.has_default_deserializer())
            .finish()
    }
}

/// Builder for [`ConversionRegistry`]. An element name is required.
pub struct ConversionRegistryBuilder<L, V: ?Sized> {
    category: &'static str,
    element_name: Option<String>,
    converters: Vec<(String, Arc<dyn Converter<L, V>>)>,
    default_deserializer: Option<DefaultDeserializer<L, V>>,
}

impl<L, V: ?Sized> ConversionRegistryBuilder<L, V> {
    #[must_use]
    pub fn element_name(mut self, name: impl Into<String>) -> Self {
        self.element_name = Some(name.into());
        self
    }

    /// Uses `name` unless an element name was already set.
    #[must_use]
    pub(crate) fn element_name_or(mut self, name: Option<&str>) -> Self {
        if self.element_name.is_none() {
            self.element_name = name.map(str::to_owned);
        }
        self
    }

    #[must_use]
    pub fn register(mut self, converter: impl Converter<L, V> + 'static) -> Self {
        self.converters
            .push((converter.key().to_owned(), Arc::new(converter)));
        self
    }

    #[must_use]
    pub fn register_arc(mut self, key: impl Into<String>, converter: Arc<dyn Converter<L, V>>) -> Self {
        self.converters.push((key.into(), converter));
        self
    }

    #[must_use]
    pub fn default_deserializer<F>(mut self, deserializer: F) -> Self
    where
        F: Fn(&Node, &ConversionRegistry<L, V>, &ConversionContext<'_, L>) -> Result<Option<Arc<V>>, ConversionError>
            + Send
            + Sync
            + 'static,
    {
        self.default_deserializer = Some(Arc::new(deserializer));
        self
    }

    /// # Errors
    ///
    /// Returns [`BuildError::MissingElementName`] if no (or an empty) element
    /// name was given.
    pub fn build(self) -> Result<ConversionRegistry<L, V>, BuildError> {
        let element_name = self
            .element_name
            .filter(|name| !name.is_empty())
            .ok_or(BuildError::MissingElementName {
                category: self.category,
            })?;

        let mut registry = ConversionRegistry {
            category: self.category,
            element_name,
            converters: HashMap::with_capacity(self.converters.len()),
            default_deserializer: self.default_deserializer,
        };
        for (key, converter) in self.converters {
            registry.register(key, converter);
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use serde_json::json;

    use super::*;
    use crate::convert::{AsAny, KeyedConverter};
    use crate::loader::LootLoader;

    trait Shape: AsAny + Debug + Send + Sync {
        fn area(&self) -> f64;
        fn converter(&self) -> Arc<dyn Converter<String, dyn Shape>>;
    }

    impl Convertible<String> for dyn Shape {
        fn own_converter(&self) -> Arc<dyn Converter<String, dyn Shape>> {
            self.converter()
        }
    }

    fn erase_shape<T: Shape + 'static>(shape: T) -> Arc<dyn Shape> {
        Arc::new(shape)
    }

    #[derive(Debug, PartialEq)]
    struct Square {
        side: f64,
    }

    const SQUARE: KeyedConverter<String, Square, dyn Shape> = KeyedConverter::new(
        "square",
        write_square,
        read_square,
        erase_shape,
    );

    fn write_square(
        square: &Square,
        into: &mut NodeMap,
        _: &ConversionContext<'_, String>,
    ) -> Result<(), ConversionError> {
        into.insert("side".into(), json!(square.side));
        Ok(())
    }

    fn read_square(node: &Node, _: &ConversionContext<'_, String>) -> Result<Square, ConversionError> {
        Ok(Square {
            side: node::require_f64(node.get("side"), "side")?,
        })
    }

    impl Shape for Square {
        fn area(&self) -> f64 {
            self.side * self.side
        }

        fn converter(&self) -> Arc<dyn Converter<String, dyn Shape>> {
            Arc::new(SQUARE)
        }
    }

    #[derive(Debug)]
    struct Dot;

    const DOT: KeyedConverter<String, Dot, dyn Shape> =
        KeyedConverter::new("dot", |_, _, _| Ok(()), |_, _| Ok(Dot), erase_shape);

    impl Shape for Dot {
        fn area(&self) -> f64 {
            0.0
        }

        fn converter(&self) -> Arc<dyn Converter<String, dyn Shape>> {
            Arc::new(DOT)
        }
    }

    fn always_dot(
        _: &Node,
        _: &ConversionRegistry<String, dyn Shape>,
        _: &ConversionContext<'_, String>,
    ) -> Result<Option<Arc<dyn Shape>>, ConversionError> {
        Ok(Some(erase_shape(Dot)))
    }

    fn loader() -> LootLoader<String> {
        LootLoader::builder().element_name("type").build().unwrap()
    }

    fn registry() -> ConversionRegistry<String, dyn Shape> {
        ConversionRegistry::builder("shapes")
            .element_name("type")
            .register(SQUARE)
            .build()
            .unwrap()
    }

    #[test]
    fn build_requires_element_name() {
        let result = ConversionRegistry::<String, dyn Shape>::builder("shapes")
            .register(SQUARE)
            .build();
        assert_eq!(
            result.unwrap_err(),
            BuildError::MissingElementName { category: "shapes" }
        );

        let empty = ConversionRegistry::<String, dyn Shape>::builder("shapes")
            .element_name("")
            .build();
        assert!(empty.is_err());
    }

    #[test]
    fn registration_lifecycle() {
        let mut registry = registry();
        assert_eq!(registry.keys(), vec!["square"]);

        assert!(registry.register_converter(DOT).is_none());
        assert_eq!(registry.len(), 2);

        let replaced = registry.register("dot", Arc::new(SQUARE));
        assert_eq!(replaced.map(|c| c.key().to_owned()), Some("dot".to_string()));
        assert_eq!(registry.lookup("dot").unwrap().key(), "square");

        assert!(registry.unregister("dot"));
        assert!(!registry.unregister("dot"));

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn shared_converters_register_under_aliases() {
        let loader = loader();
        let ctx = loader.conversion_context();
        let registry: ConversionRegistry<String, dyn Shape> = ConversionRegistry::builder("shapes")
            .element_name("type")
            .register(SQUARE)
            .register_arc("box", Arc::new(SQUARE))
            .build()
            .unwrap();

        assert_eq!(registry.keys(), vec!["box", "square"]);
        let node = json!({ "type": "box", "side": 2.0 });
        let shape = registry.deserialize(Some(&node), "shape", &ctx).unwrap();
        assert_eq!(shape.area(), 4.0);
        // written back under the converter's own key
        assert_eq!(
            registry.serialize(shape.as_ref(), &ctx).unwrap(),
            json!({ "type": "square", "side": 2.0 })
        );
    }

    #[test]
    fn keyed_converters_read_concrete_values() {
        let loader = loader();
        let ctx = loader.conversion_context();

        let square = SQUARE
            .deserialize_concrete(&json!({ "side": 1.5 }), &ctx)
            .unwrap();
        assert_eq!(square, Square { side: 1.5 });
        assert!(SQUARE.deserialize_concrete(&json!({}), &ctx).is_err());
    }

    #[test]
    fn dispatches_on_discriminator() {
        let loader = loader();
        let ctx = loader.conversion_context();
        let node = json!({ "type": "square", "side": 3.0 });

        let shape = registry().deserialize(Some(&node), "shape", &ctx).unwrap();
        assert_eq!(shape.area(), 9.0);
    }

    #[test]
    fn unknown_key_is_a_lookup_failure() {
        let loader = loader();
        let ctx = loader.conversion_context();
        let node = json!({ "type": "unknown_key", "side": 1 });

        let err = registry().deserialize(Some(&node), "shape", &ctx).unwrap_err();
        assert_eq!(
            err,
            ConversionError::NoConverter {
                category: "shapes",
                key: "unknown_key".to_string(),
            }
        );
        assert!(err.to_string().contains("unknown_key"));
    }

    #[test]
    fn typed_dispatch_wins_over_default() {
        let loader = loader();
        let ctx = loader.conversion_context();
        let mut registry = registry();
        registry.set_default_deserializer(Arc::new(always_dot));

        // a map with a string discriminator never reaches the default
        let unknown = json!({ "type": "circle" });
        assert!(matches!(
            registry.deserialize(Some(&unknown), "shape", &ctx),
            Err(ConversionError::NoConverter { .. })
        ));

        let bare = json!(4);
        let shape = registry.deserialize(Some(&bare), "shape", &ctx).unwrap();
        assert_eq!(shape.area(), 0.0);
    }

    #[test]
    fn default_deserializer_reads_bare_scalars() {
        let loader = loader();
        let ctx = loader.conversion_context();
        let registry: ConversionRegistry<String, dyn Shape> = ConversionRegistry::builder("shapes")
            .element_name("type")
            .register(SQUARE)
            .default_deserializer(|node, _, _| {
                Ok(node
                    .as_f64()
                    .map(|side| erase_shape(Square { side })))
            })
            .build()
            .unwrap();

        let shape = registry.deserialize(Some(&json!(2.0)), "shape", &ctx).unwrap();
        assert_eq!(shape.area(), 4.0);

        // declined by the default deserializer
        let err = registry
            .deserialize(Some(&json!("two")), "shape", &ctx)
            .unwrap_err();
        assert_eq!(
            err,
            ConversionError::ExpectedValue {
                category: "shapes",
                label: "shape".to_string(),
                found: crate::convert::NodeKind::String,
            }
        );
    }

    #[test]
    fn missing_node_without_default_fails() {
        let loader = loader();
        let ctx = loader.conversion_context();

        let err = registry().deserialize(None, "rolls", &ctx).unwrap_err();
        assert!(matches!(err, ConversionError::ExpectedValue { label, .. } if label == "rolls"));
    }

    #[test]
    fn serialize_uses_the_values_own_converter() {
        let loader = loader();
        let ctx = loader.conversion_context();
        // DOT is not registered, the value still knows how to write itself
        let registry = registry();

        let node = registry.serialize(&Dot, &ctx).unwrap();
        assert_eq!(node, json!({ "type": "dot" }));

        let node = registry.serialize(&Square { side: 1.5 }, &ctx).unwrap();
        assert_eq!(node, json!({ "type": "square", "side": 1.5 }));
    }

    #[test]
    fn keyed_converter_rejects_other_types() {
        let loader = loader();
        let ctx = loader.conversion_context();
        let mut map = NodeMap::new();

        let err = SQUARE.serialize(&Dot, &mut map, &ctx).unwrap_err();
        assert!(matches!(err, ConversionError::UnexpectedValue { key, .. } if key == "square"));
    }

    #[test]
    fn lists_are_located() {
        let loader = loader();
        let ctx = loader.conversion_context();
        let registry = registry();

        assert!(registry.deserialize_list(None, "shapes", &ctx).unwrap().is_empty());

        let node = json!([
            { "type": "square", "side": 1 },
            { "type": "square" },
        ]);
        let err = registry
            .deserialize_list(Some(&node), "shapes", &ctx)
            .unwrap_err();
        assert_eq!(err.path(), Some("shapes[1]"));
        assert!(matches!(
            err.root_cause(),
            ConversionError::MissingField { field } if field == "side"
        ));

        let shapes: Vec<Arc<dyn Shape>> = vec![erase_shape(Square { side: 2.0 }), erase_shape(Dot)];
        let node = registry.serialize_list(&shapes, &ctx).unwrap();
        assert_eq!(
            node,
            json!([{ "type": "square", "side": 2.0 }, { "type": "dot" }])
        );
    }
}
