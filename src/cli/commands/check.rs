//! `gear check` command - Consistency check of items, tags and packs

use console::style;
use miette::Result;

use crate::cli::helpers::{format_short_id, Workspace};
use crate::cli::GlobalOpts;
use crate::core::store::InventoryStore;

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Only print the summary line
    #[arg(long)]
    pub summary: bool,
}

pub fn run(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let inventory = ws.store.load_inventory();
    let packs = ws.store.load_packs();

    let dangling = inventory.verify();
    let mut stale = 0;

    if !args.summary {
        for d in &dangling {
            println!(
                "{} {} {} has no tag path {}",
                style("✗").red(),
                style(format_short_id(&d.item)).dim(),
                style(&d.name).yellow(),
                d.path
            );
        }
    }
    for pack in packs.iter() {
        let missing: Vec<_> = pack
            .items
            .iter()
            .filter(|id| !inventory.items().iter().any(|i| i.id == **id))
            .collect();
        stale += missing.len();
        if !args.summary {
            for id in missing {
                println!(
                    "{} pack {} references missing item {}",
                    style("✗").red(),
                    style(&pack.name).yellow(),
                    style(format_short_id(id)).dim()
                );
            }
        }
    }

    let problems = dangling.len() + stale;
    if problems > 0 {
        return Err(miette::miette!(
            "{} problem(s): {} item(s) off the tag hierarchy, {} stale pack entries",
            problems,
            dangling.len(),
            stale
        ));
    }

    if !global.quiet {
        println!(
            "{} {} items, {} tags and {} packs are consistent",
            style("✓").green(),
            inventory.items().len(),
            inventory.tags().len(),
            packs.len()
        );
    }
    Ok(())
}
