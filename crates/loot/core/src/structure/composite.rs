use std::any::type_name;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{ConditionalTransform, LootEntry, LootItem, LootOption};
use crate::context::{ConversionContext, GenerationContext};
use crate::convert::{ConversionError, Converter, Node, NodeMap, node};
use crate::generate::GenerationError;

/// How a composite combines its children's options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CompositeKind {
    /// All children's options, in order.
    Sequence,
    /// The first child offering any option.
    Alternatives,
    /// All children's options, in order. Marks children meant to go together.
    Group,
}

impl CompositeKind {
    pub const ALL: [CompositeKind; 3] = [Self::Sequence, Self::Alternatives, Self::Group];

    /// Discriminator value of this kind.
    pub fn key(self) -> &'static str {
        self.into()
    }
}

/// An entry combining child entries.
///
/// When its own conditions fail a composite offers nothing, regardless of
/// its children.
#[derive(Debug)]
pub struct CompositeEntry<L> {
    kind: CompositeKind,
    children: Vec<Arc<dyn LootEntry<L>>>,
    conditions: ConditionalTransform<L>,
}

impl<L: 'static> CompositeEntry<L> {
    pub const CHILDREN_FIELD: &'static str = "children";

    pub fn new(kind: CompositeKind, children: Vec<Arc<dyn LootEntry<L>>>) -> Self {
        Self {
            kind,
            children,
            conditions: ConditionalTransform::always(),
        }
    }

    pub fn sequence(children: Vec<Arc<dyn LootEntry<L>>>) -> Self {
        Self::new(CompositeKind::Sequence, children)
    }

    pub fn alternatives(children: Vec<Arc<dyn LootEntry<L>>>) -> Self {
        Self::new(CompositeKind::Alternatives, children)
    }

    pub fn group(children: Vec<Arc<dyn LootEntry<L>>>) -> Self {
        Self::new(CompositeKind::Group, children)
    }

    #[must_use]
    pub fn with_conditions(mut self, conditions: ConditionalTransform<L>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn kind(&self) -> CompositeKind {
        self.kind
    }

    pub fn children(&self) -> &[Arc<dyn LootEntry<L>>] {
        &self.children
    }
}

impl<L: LootItem> LootEntry<L> for CompositeEntry<L> {
    fn request_options<'a>(
        &'a self,
        ctx: &GenerationContext,
    ) -> Result<Vec<&'a dyn LootOption<L>>, GenerationError> {
        if !self.conditions.test(ctx)? {
            return Ok(Vec::new());
        }

        match self.kind {
            CompositeKind::Sequence | CompositeKind::Group => {
                let mut options = Vec::new();
                for child in &self.children {
                    options.extend(child.request_options(ctx)?);
                }
                Ok(options)
            }
            CompositeKind::Alternatives => {
                for child in &self.children {
                    let options = child.request_options(ctx)?;
                    if !options.is_empty() {
                        return Ok(options);
                    }
                }
                Ok(Vec::new())
            }
        }
    }

    fn converter(&self) -> Arc<dyn Converter<L, dyn LootEntry<L>>> {
        Arc::new(CompositeConverter::new(self.kind))
    }
}

/// Converter for one [`CompositeKind`].
pub struct CompositeConverter<L> {
    kind: CompositeKind,
    _item: PhantomData<fn() -> L>,
}

impl<L: 'static> CompositeConverter<L> {
    pub const fn new(kind: CompositeKind) -> Self {
        Self {
            kind,
            _item: PhantomData,
        }
    }
}

impl<L: LootItem> Converter<L, dyn LootEntry<L>> for CompositeConverter<L> {
    fn key(&self) -> &str {
        self.kind.key()
    }

    fn value_type(&self) -> &'static str {
        type_name::<CompositeEntry<L>>()
    }

    fn serialize(
        &self,
        value: &dyn LootEntry<L>,
        into: &mut NodeMap,
        ctx: &ConversionContext<'_, L>,
    ) -> Result<(), ConversionError> {
        let composite = value
            .as_any()
            .downcast_ref::<CompositeEntry<L>>()
            .ok_or_else(|| ConversionError::UnexpectedValue {
                key: self.kind.key().to_owned(),
                expected: type_name::<CompositeEntry<L>>(),
            })?;

        let children = ctx
            .loader()
            .entries()
            .serialize_list(&composite.children, ctx)?;
        into.insert(CompositeEntry::<L>::CHILDREN_FIELD.to_owned(), children);
        composite.conditions.serialize(into, ctx)
    }

    fn deserialize(
        &self,
        node: &Node,
        ctx: &ConversionContext<'_, L>,
    ) -> Result<Arc<dyn LootEntry<L>>, ConversionError> {
        let map = node::require_map(Some(node), self.kind.key())?;
        let children = map.get(CompositeEntry::<L>::CHILDREN_FIELD);
        node::require_list(children, CompositeEntry::<L>::CHILDREN_FIELD)?;
        let children = ctx.loader().entries().deserialize_list(
            children,
            CompositeEntry::<L>::CHILDREN_FIELD,
            ctx,
        )?;
        let conditions = ConditionalTransform::deserialize(map, ctx)?;
        Ok(Arc::new(
            CompositeEntry::new(self.kind, children).with_conditions(conditions),
        ))
    }
}

/// One converter per composite kind.
pub fn composite_converters<L: LootItem>() -> impl Iterator<Item = CompositeConverter<L>> {
    CompositeKind::ALL.into_iter().map(CompositeConverter::new)
}
