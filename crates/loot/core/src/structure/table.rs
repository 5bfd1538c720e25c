use std::sync::Arc;

use tracing::{debug, debug_span};

use super::{FUNCTIONS_FIELD, LootItem, LootModifier, LootPool, apply_modifiers};
use crate::context::{ConversionContext, GenerationContext};
use crate::convert::{ConversionError, Node, NodeMap, node};
use crate::generate::GenerationError;

/// Ordered pools plus functions applied to everything the pools produce.
#[derive(Debug)]
pub struct LootTable<L> {
    pools: Vec<LootPool<L>>,
    functions: Vec<Arc<dyn LootModifier<L>>>,
    explicit_functions: bool,
}

impl<L: 'static> LootTable<L> {
    pub const POOLS_FIELD: &'static str = "pools";

    pub fn new(pools: Vec<LootPool<L>>) -> Self {
        Self {
            pools,
            functions: Vec::new(),
            explicit_functions: false,
        }
    }

    #[must_use]
    pub fn with_functions(mut self, functions: Vec<Arc<dyn LootModifier<L>>>) -> Self {
        self.functions = functions;
        self
    }

    pub fn pools(&self) -> &[LootPool<L>] {
        &self.pools
    }

    pub fn functions(&self) -> &[Arc<dyn LootModifier<L>>] {
        &self.functions
    }

    /// Rolls every pool in order. Failures are located, e.g. `pools[1].entries[0]`.
    pub fn generate(&self, ctx: &GenerationContext) -> Result<Vec<L>, GenerationError> {
        let _span = debug_span!("generate_table", pools = self.pools.len()).entered();

        let mut items = Vec::new();
        for (index, pool) in self.pools.iter().enumerate() {
            let generated = pool
                .generate(ctx)
                .map_err(|err| err.at(format!("{}[{index}]", Self::POOLS_FIELD)))?;
            items.extend(generated);
        }
        let items = apply_modifiers(&self.functions, items, ctx)?;
        debug!(items = items.len(), "table generated");
        Ok(items)
    }
}

impl<L: LootItem> LootTable<L> {
    pub fn serialize(&self, ctx: &ConversionContext<'_, L>) -> Result<Node, ConversionError> {
        let pools = self
            .pools
            .iter()
            .enumerate()
            .map(|(index, pool)| {
                pool.serialize(ctx)
                    .map_err(|err| err.at(format!("{}[{index}]", Self::POOLS_FIELD)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut map = NodeMap::new();
        map.insert(Self::POOLS_FIELD.to_owned(), Node::Array(pools));
        if self.explicit_functions || !self.functions.is_empty() {
            map.insert(
                FUNCTIONS_FIELD.to_owned(),
                ctx.loader()
                    .modifiers()
                    .serialize_list(&self.functions, ctx)?,
            );
        }
        Ok(Node::Object(map))
    }

    /// Reads a table. Failures are located, e.g. `pools[0].entries[2]`.
    pub fn deserialize(node: &Node, ctx: &ConversionContext<'_, L>) -> Result<Self, ConversionError> {
        let map = node::require_map(Some(node), "table")?;

        let pools = node::require_list(map.get(Self::POOLS_FIELD), Self::POOLS_FIELD)?
            .iter()
            .enumerate()
            .map(|(index, pool)| {
                LootPool::deserialize(pool, ctx)
                    .map_err(|err| err.at(format!("{}[{index}]", Self::POOLS_FIELD)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let functions = map.get(FUNCTIONS_FIELD);
        let explicit_functions = node::is_present(functions);
        let functions = ctx
            .loader()
            .modifiers()
            .deserialize_list(functions, FUNCTIONS_FIELD, ctx)?;

        Ok(Self {
            pools,
            functions,
            explicit_functions,
        })
    }
}
