//! `gear init` command - Initialize a new gear project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::GlobalOpts;
use crate::core::defaults;
use crate::core::project::{Project, ProjectError};
use crate::core::store::{InventoryStore, JsonStore};
use crate::entities::pack::PackBook;
use crate::inventory::catalog::Inventory;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Start with no items and no tags instead of the starter set
    #[arg(long)]
    pub empty: bool,

    /// Force initialization even if .gear/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    let project = match Project::init(&path, args.force) {
        Ok(project) => project,
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} gear project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("gear init --force").yellow());
            return Ok(());
        }
        Err(e) => return Err(miette::miette!("{}", e)),
    };

    let inventory = if args.empty {
        Inventory::new()
    } else {
        defaults::inventory()
    };
    let store = JsonStore::for_project(&project);
    store.save_inventory(&inventory)?;
    store.save_packs(&PackBook::new())?;

    if global.quiet {
        return Ok(());
    }

    println!(
        "{} Initialized gear project at {}",
        style("✓").green(),
        style(project.root().display()).cyan()
    );
    println!();
    print_structure(project.root());
    println!();
    if args.empty {
        println!("Started with an empty inventory.");
    } else {
        println!(
            "Started with {} items under {} top tags.",
            inventory.items().len(),
            inventory.tags().roots().count()
        );
    }
    println!();
    println!("Next steps:");
    println!("  {} Add a piece of gear", style("gear item new").yellow());
    println!("  {} Browse the tag hierarchy", style("gear tag tree").yellow());
    println!("  {} Start a pack", style("gear pack new <NAME>").yellow());
    Ok(())
}

fn print_structure(root: &Path) {
    let entries = [
        ".gear/",
        ".gear/config.yaml",
        "inventory/",
        "inventory/items.json",
        "inventory/tags.json",
        "inventory/packs.json",
    ];

    for entry in entries {
        if root.join(entry).exists() {
            let prefix = if entry.ends_with('/') { "📁" } else { "📄" };
            println!("  {} {}", prefix, style(entry).dim());
        }
    }
}
