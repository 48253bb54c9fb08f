//! The `platewise vocab` command: list canonical dish names.

use clap::Args;
use platewise_core::vocabulary::{default_grams, CANDIDATES};

/// Arguments for the `vocab` command.
#[derive(Args, Debug)]
pub struct VocabArgs {
    /// Show the default portion weight next to each dish
    #[arg(long)]
    pub grams: bool,
}

pub async fn execute(args: VocabArgs) -> anyhow::Result<()> {
    for line in render(&args) {
        println!("{line}");
    }
    Ok(())
}

fn render(args: &VocabArgs) -> Vec<String> {
    CANDIDATES
        .iter()
        .map(|name| {
            if args.grams {
                format!("{name:<20} {:>4} g", default_grams(name))
            } else {
                name.to_string()
            }
        })
        .collect()
}
