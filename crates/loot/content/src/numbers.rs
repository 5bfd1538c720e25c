//! Built-in number providers.
//!
//! Besides the keyed forms (`constant`, `uniform`, `binomial`) two shorthand
//! nodes are accepted: a bare number reads as `constant`, and an untyped map
//! with `min` and `max` reads as `uniform`.

use std::sync::Arc;

use loot_core::convert::node;
use loot_core::structure::erase_number;
use loot_core::{
    ConversionError, ConversionRegistry, Converter, GenerationContext, GenerationError,
    KeyedConverter, Node, NodeMap, NumberProvider,
};
use serde_json::json;

use crate::Ctx;
use crate::item::ItemStack;

type Number = Arc<dyn NumberProvider<ItemStack>>;
type NumberConverter<T> = KeyedConverter<ItemStack, T, dyn NumberProvider<ItemStack>>;

#[derive(Debug)]
pub struct Constant {
    pub value: f64,
}

pub const CONSTANT: NumberConverter<Constant> =
    KeyedConverter::new("constant", write_constant, read_constant, erase_number);

fn write_constant(constant: &Constant, into: &mut NodeMap, _: &Ctx<'_>) -> Result<(), ConversionError> {
    into.insert("value".into(), json!(constant.value));
    Ok(())
}

fn read_constant(node: &Node, _: &Ctx<'_>) -> Result<Constant, ConversionError> {
    Ok(Constant {
        value: node::require_f64(node.get("value"), "value")?,
    })
}

impl NumberProvider<ItemStack> for Constant {
    fn get_f64(&self, _: &GenerationContext) -> Result<f64, GenerationError> {
        Ok(self.value)
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn NumberProvider<ItemStack>>> {
        Arc::new(CONSTANT)
    }
}

/// Uniform over `[min, max)` as a float, `[ceil(min), floor(max)]` as an integer.
///
/// A range holding no integer, such as `2.2..2.4`, yields `min` rounded.
#[derive(Debug)]
pub struct Uniform {
    pub min: f64,
    pub max: f64,
}

pub const UNIFORM: NumberConverter<Uniform> =
    KeyedConverter::new("uniform", write_uniform, read_uniform, erase_number);

fn write_uniform(uniform: &Uniform, into: &mut NodeMap, _: &Ctx<'_>) -> Result<(), ConversionError> {
    into.insert("min".into(), json!(uniform.min));
    into.insert("max".into(), json!(uniform.max));
    Ok(())
}

fn read_uniform(node: &Node, _: &Ctx<'_>) -> Result<Uniform, ConversionError> {
    let min = node::require_f64(node.get("min"), "min")?;
    let max = node::require_f64(node.get("max"), "max")?;
    if min > max {
        return Err(ConversionError::invalid("uniform", format!("min {min} exceeds max {max}")));
    }
    Ok(Uniform { min, max })
}

impl NumberProvider<ItemStack> for Uniform {
    fn get_f64(&self, ctx: &GenerationContext) -> Result<f64, GenerationError> {
        Ok(self.min + ctx.random_f64() * (self.max - self.min))
    }

    fn get_i64(&self, ctx: &GenerationContext) -> Result<i64, GenerationError> {
        let low = self.min.ceil() as i64;
        let high = self.max.floor() as i64;
        if high < low {
            return Ok(self.min.round() as i64);
        }
        if high == low {
            return Ok(low);
        }
        let span = high.abs_diff(low) + 1;
        Ok(low.saturating_add_unsigned(ctx.random_below(span)))
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn NumberProvider<ItemStack>>> {
        Arc::new(UNIFORM)
    }
}

/// Successes out of `n` trials of probability `p`, with `n` at most
/// [`MAX_TRIALS`](Self::MAX_TRIALS).
#[derive(Debug)]
pub struct Binomial {
    pub n: u64,
    pub p: f64,
}

impl Binomial {
    pub const MAX_TRIALS: u64 = 1 << 16;
}

pub const BINOMIAL: NumberConverter<Binomial> =
    KeyedConverter::new("binomial", write_binomial, read_binomial, erase_number);

fn write_binomial(binomial: &Binomial, into: &mut NodeMap, _: &Ctx<'_>) -> Result<(), ConversionError> {
    into.insert("n".into(), json!(binomial.n));
    into.insert("p".into(), json!(binomial.p));
    Ok(())
}

fn read_binomial(node: &Node, _: &Ctx<'_>) -> Result<Binomial, ConversionError> {
    let n = node::require_u64(node.get("n"), "n")?;
    if n > Binomial::MAX_TRIALS {
        return Err(ConversionError::invalid(
            "n",
            format!("{n} trials exceeds the limit of {}", Binomial::MAX_TRIALS),
        ));
    }
    let p = node::require_f64(node.get("p"), "p")?;
    if !(0.0..=1.0).contains(&p) {
        return Err(ConversionError::invalid("p", format!("{p} is not within [0, 1]")));
    }
    Ok(Binomial { n, p })
}

impl NumberProvider<ItemStack> for Binomial {
    fn get_f64(&self, ctx: &GenerationContext) -> Result<f64, GenerationError> {
        if self.n > Self::MAX_TRIALS {
            return Err(GenerationError::invalid(format!(
                "binomial with {} trials exceeds the limit of {}",
                self.n,
                Self::MAX_TRIALS
            )));
        }
        let successes = ctx.with_random(|random| {
            (0..self.n).filter(|_| random.next_f64() < self.p).count()
        });
        Ok(successes as f64)
    }

    fn converter(&self) -> Arc<dyn Converter<ItemStack, dyn NumberProvider<ItemStack>>> {
        Arc::new(BINOMIAL)
    }
}

/// Default deserializer for number providers.
pub fn shorthand_number(
    node: &Node,
    _: &ConversionRegistry<ItemStack, dyn NumberProvider<ItemStack>>,
    ctx: &Ctx<'_>,
) -> Result<Option<Number>, ConversionError> {
    if let Some(value) = node.as_f64() {
        return Ok(Some(constant(value)));
    }
    if let Some(map) = node.as_object()
        && map.contains_key("min")
        && map.contains_key("max")
    {
        return read_uniform(node, ctx).map(|uniform| Some(erase_number(uniform)));
    }
    Ok(None)
}

pub fn constant(value: f64) -> Number {
    erase_number(Constant { value })
}

pub fn uniform(min: f64, max: f64) -> Number {
    erase_number(Uniform { min, max })
}
