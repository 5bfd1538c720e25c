//! A tiny catalog over `String` items shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use loot_core::convert::node;
use loot_core::structure::{erase_condition, erase_entry, erase_modifier, erase_number};
use loot_core::{
    ConditionalTransform, ConversionContext, ConversionError, ConversionRegistry, Converter,
    EntryWeight, FixedRandom, GenerationContext, GenerationError, Key, KeyedConverter,
    LootCondition, LootContext, LootEntry, LootLoader, LootModifier, LootOption, Node, NodeMap,
    NumberProvider, TerminalEntry,
};
use serde_json::json;

pub type Ctx<'a> = ConversionContext<'a, String>;

pub const FLAG: Key<bool> = Key::new("flag");

// ---------------------------------------------------------------------------
// flag_set: true when the FLAG fact equals `expected` (absent reads as false)
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct FlagSet {
    pub expected: bool,
}

pub const FLAG_SET: KeyedConverter<String, FlagSet, dyn LootCondition<String>> =
    KeyedConverter::new("flag_set", write_flag_set, read_flag_set, erase_condition);

fn write_flag_set(flag: &FlagSet, into: &mut NodeMap, _: &Ctx<'_>) -> Result<(), ConversionError> {
    into.insert("expected".into(), json!(flag.expected));
    Ok(())
}

fn read_flag_set(node: &Node, _: &Ctx<'_>) -> Result<FlagSet, ConversionError> {
    Ok(FlagSet {
        expected: node::require_bool(node.get("expected"), "expected")?,
    })
}

impl LootCondition<String> for FlagSet {
    fn verify(&self, ctx: &GenerationContext) -> Result<bool, GenerationError> {
        let flag = ctx.get(&FLAG)?.copied().unwrap_or(false);
        Ok(flag == self.expected)
    }

    fn converter(&self) -> Arc<dyn Converter<String, dyn LootCondition<String>>> {
        Arc::new(FLAG_SET)
    }
}

pub fn flag_set(expected: bool) -> Arc<dyn LootCondition<String>> {
    erase_condition(FlagSet { expected })
}

// ---------------------------------------------------------------------------
// const: a fixed number, also read from bare numeric nodes
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Const(pub f64);

pub const CONST: KeyedConverter<String, Const, dyn NumberProvider<String>> =
    KeyedConverter::new("const", write_const, read_const, erase_number);

fn write_const(value: &Const, into: &mut NodeMap, _: &Ctx<'_>) -> Result<(), ConversionError> {
    into.insert("value".into(), json!(value.0));
    Ok(())
}

fn read_const(node: &Node, _: &Ctx<'_>) -> Result<Const, ConversionError> {
    Ok(Const(node::require_f64(node.get("value"), "value")?))
}

fn bare_const(
    node: &Node,
    _: &ConversionRegistry<String, dyn NumberProvider<String>>,
    _: &Ctx<'_>,
) -> Result<Option<Arc<dyn NumberProvider<String>>>, ConversionError> {
    Ok(node.as_f64().map(|value| erase_number(Const(value))))
}

impl NumberProvider<String> for Const {
    fn get_f64(&self, _: &GenerationContext) -> Result<f64, GenerationError> {
        Ok(self.0)
    }

    fn converter(&self) -> Arc<dyn Converter<String, dyn NumberProvider<String>>> {
        Arc::new(CONST)
    }
}

pub fn constant(value: f64) -> Arc<dyn NumberProvider<String>> {
    erase_number(Const(value))
}

// ---------------------------------------------------------------------------
// suffix: appends text to the item
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Suffix {
    pub suffix: String,
    pub conditions: ConditionalTransform<String>,
}

pub const SUFFIX: KeyedConverter<String, Suffix, dyn LootModifier<String>> =
    KeyedConverter::new("suffix", write_suffix, read_suffix, erase_modifier);

fn write_suffix(suffix: &Suffix, into: &mut NodeMap, ctx: &Ctx<'_>) -> Result<(), ConversionError> {
    into.insert("suffix".into(), json!(suffix.suffix));
    suffix.conditions.serialize(into, ctx)
}

fn read_suffix(node: &Node, ctx: &Ctx<'_>) -> Result<Suffix, ConversionError> {
    let map = node::require_map(Some(node), "suffix")?;
    Ok(Suffix {
        suffix: node::require_str(map.get("suffix"), "suffix")?.to_owned(),
        conditions: ConditionalTransform::deserialize(map, ctx)?,
    })
}

impl LootModifier<String> for Suffix {
    fn conditions(&self) -> &ConditionalTransform<String> {
        &self.conditions
    }

    fn transform(&self, item: String, _: &GenerationContext) -> Result<String, GenerationError> {
        Ok(item + &self.suffix)
    }

    fn converter(&self) -> Arc<dyn Converter<String, dyn LootModifier<String>>> {
        Arc::new(SUFFIX)
    }
}

pub fn suffix(
    suffix: &str,
    conditions: Vec<Arc<dyn LootCondition<String>>>,
) -> Arc<dyn LootModifier<String>> {
    erase_modifier(Suffix {
        suffix: suffix.to_owned(),
        conditions: ConditionalTransform::new(conditions),
    })
}

// ---------------------------------------------------------------------------
// token: a terminal entry producing its name, also read from bare strings
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Token {
    pub name: String,
    pub terminal: TerminalEntry<String>,
}

pub const TOKEN: KeyedConverter<String, Token, dyn LootEntry<String>> =
    KeyedConverter::new("token", write_token, read_token, erase_entry);

fn write_token(token: &Token, into: &mut NodeMap, ctx: &Ctx<'_>) -> Result<(), ConversionError> {
    into.insert("name".into(), json!(token.name));
    token.terminal.serialize(into, ctx)
}

fn read_token(node: &Node, ctx: &Ctx<'_>) -> Result<Token, ConversionError> {
    let map = node::require_map(Some(node), "token")?;
    Ok(Token {
        name: node::require_str(map.get("name"), "name")?.to_owned(),
        terminal: TerminalEntry::deserialize(map, ctx)?,
    })
}

fn bare_token(
    node: &Node,
    _: &ConversionRegistry<String, dyn LootEntry<String>>,
    _: &Ctx<'_>,
) -> Result<Option<Arc<dyn LootEntry<String>>>, ConversionError> {
    Ok(node.as_str().map(|name| token(name, 1)))
}

impl LootEntry<String> for Token {
    fn request_options<'a>(
        &'a self,
        ctx: &GenerationContext,
    ) -> Result<Vec<&'a dyn LootOption<String>>, GenerationError> {
        self.terminal.options(self, ctx)
    }

    fn converter(&self) -> Arc<dyn Converter<String, dyn LootEntry<String>>> {
        Arc::new(TOKEN)
    }
}

impl LootOption<String> for Token {
    fn weight(&self, ctx: &GenerationContext) -> Result<i64, GenerationError> {
        self.terminal.weight(ctx)
    }

    fn generate(&self, ctx: &GenerationContext) -> Result<Vec<String>, GenerationError> {
        self.terminal.finish(vec![self.name.clone()], ctx)
    }
}

pub fn token(name: &str, weight: i64) -> Arc<dyn LootEntry<String>> {
    token_with(name, TerminalEntry::new().with_weight(EntryWeight::new(weight, 0)))
}

pub fn token_with(name: &str, terminal: TerminalEntry<String>) -> Arc<dyn LootEntry<String>> {
    erase_entry(Token {
        name: name.to_owned(),
        terminal,
    })
}

// ---------------------------------------------------------------------------
// fixtures
// ---------------------------------------------------------------------------

pub fn loader() -> LootLoader<String> {
    LootLoader::builder()
        .element_name("type")
        .conditions(|registry| registry.register(FLAG_SET))
        .number_providers(|registry| registry.register(CONST).default_deserializer(bare_const))
        .modifiers(|registry| registry.register(SUFFIX))
        .entries(|registry| registry.register(TOKEN).default_deserializer(bare_token))
        .build()
        .expect("test loader builds")
}

pub fn fixed(draws: impl IntoIterator<Item = u64>) -> GenerationContext {
    GenerationContext::builder()
        .random(FixedRandom::new(draws))
        .build()
        .expect("random source is set")
}

pub fn seeded(seed: u64) -> GenerationContext {
    GenerationContext::builder()
        .seed(seed)
        .build()
        .expect("random source is set")
}
