//! Roll a loot table.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use loot_content::ItemStack;
use loot_content::keys::{EXPLOSION_RADIUS, KILLED_BY_PLAYER, TOOL};
use loot_core::GenerationContext;
use loot_core::context::keys::LUCK;
use tracing::debug;

use super::{DataArgs, find_table};
use crate::config::CliConfig;

/// Generate items from a table
#[derive(Parser, Debug)]
pub struct Roll {
    /// Table name (file stem under the tables directory)
    #[arg(value_name = "TABLE")]
    table: String,

    #[command(flatten)]
    data: DataArgs,

    /// Seed for the random source (defaults to `LOOT_SEED`, the configured seed, then random)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of independent rolls
    #[arg(short = 'n', long, default_value_t = 1)]
    times: u32,

    /// Luck of the player triggering the roll
    #[arg(short, long, default_value_t = 0.0)]
    luck: f64,

    /// Mark the loot source as killed by a player
    #[arg(long)]
    killed_by_player: bool,

    /// Id of the tool used
    #[arg(short, long)]
    tool: Option<String>,

    /// Radius of the explosion that destroyed the source
    #[arg(long)]
    explosion_radius: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OutputFormat {
    /// Item counts per roll
    Summary,
    /// Full JSON output, one array of stacks per roll
    Json,
}

impl Roll {
    pub fn execute(self, config: &CliConfig) -> Result<()> {
        let content = self.data.load(config)?;
        let table = find_table(&content, &self.table)?;

        let seed = self
            .seed
            .or(config.seed)
            .or(content.config.default_seed)
            .unwrap_or_else(rand::random);
        let ctx = self.context(seed)?;
        debug!(table = %self.table, seed, times = self.times, "rolling");

        let mut rolls = Vec::with_capacity(self.times as usize);
        for index in 0..self.times {
            let items = table
                .generate(&ctx)
                .with_context(|| format!("Roll {} of table \"{}\" failed", index + 1, self.table))?;
            rolls.push(items);
        }

        match self.format {
            OutputFormat::Summary => self.print_summary(seed, &rolls),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rolls)?),
        }
        Ok(())
    }

    /// One context for every roll, so `--times` continues the same random stream.
    fn context(&self, seed: u64) -> Result<GenerationContext> {
        let mut builder = GenerationContext::builder()
            .seed(seed)
            .with_information(&LUCK, self.luck);
        if self.killed_by_player {
            builder = builder.with_information(&KILLED_BY_PLAYER, true);
        }
        if let Some(tool) = &self.tool {
            builder = builder.with_information(&TOOL, tool.clone());
        }
        if let Some(radius) = self.explosion_radius {
            builder = builder.with_information(&EXPLOSION_RADIUS, radius);
        }
        Ok(builder.build()?)
    }

    fn print_summary(&self, seed: u64, rolls: &[Vec<ItemStack>]) {
        println!(
            "{} {} {}",
            style("Table").bold(),
            style(&self.table).cyan().bold(),
            style(format!("(seed {seed})")).dim()
        );

        for (index, items) in rolls.iter().enumerate() {
            if rolls.len() > 1 {
                println!("{}", style(format!("Roll {}", index + 1)).yellow());
            }
            if items.is_empty() {
                println!("  {}", style("nothing").dim());
            }
            for item in items {
                println!("  {}", describe(item));
            }
        }

        if rolls.len() > 1 {
            println!();
            println!("{}", style("Totals").bold());
            for (id, count) in totals(rolls) {
                println!("  {} {}", style(format!("{count:>5}")).green(), id);
            }
        }
    }
}

fn describe(item: &ItemStack) -> String {
    let mut line = format!("{} x {}", style(item.count).green(), item.id);
    if item.max_damage > 0 {
        line.push_str(&format!(
            " {}",
            style(format!("[{}/{}]", item.max_damage - item.damage.min(item.max_damage), item.max_damage)).dim()
        ));
    }
    if !item.enchantments.is_empty() {
        let enchantments = item
            .enchantments
            .iter()
            .map(|(name, level)| format!("{name} {level}"))
            .collect::<Vec<_>>()
            .join(", ");
        line.push_str(&format!(" {}", style(enchantments).magenta()));
    }
    line
}

fn totals(rolls: &[Vec<ItemStack>]) -> BTreeMap<&str, u64> {
    let mut totals = BTreeMap::new();
    for item in rolls.iter().flatten() {
        *totals.entry(item.id.as_str()).or_default() += u64::from(item.count);
    }
    totals
}

#[cfg(test)]
mod tests {
    use loot_content::ItemDefinition;

    use super::*;

    #[test]
    fn totals_sum_counts_across_rolls() {
        let mut bones = ItemStack::from_definition(&ItemDefinition::named("bone"));
        bones.count = 3;
        let gem = ItemStack::from_definition(&ItemDefinition::named("gem"));

        let rolls = vec![vec![bones.clone(), gem.clone()], vec![bones]];
        let totals = totals(&rolls);
        assert_eq!(totals["bone"], 6);
        assert_eq!(totals["gem"], 1);
    }
}
