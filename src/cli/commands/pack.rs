//! `gear pack` command - Pack assembly, weight analysis and pack lists

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::item::print_items;
use crate::cli::helpers::{success, truncate_str, Workspace};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityId;
use crate::core::store::InventoryStore;
use crate::entities::pack::{Pack, PackBook};
use crate::inventory::aggregate::{drill, format_weight, weight_distribution, PackAnalysis};
use crate::inventory::catalog::Inventory;
use crate::report::{PackList, ReportRenderer};

#[derive(Subcommand, Debug)]
pub enum PackCommands {
    /// Create an empty pack
    New(NewArgs),

    /// List packs with their totals
    List,

    /// Show the items in a pack
    Show(PackRef),

    /// Add items to a pack
    Add(ItemsArgs),

    /// Remove items from a pack
    Remove(ItemsArgs),

    /// Flip items in or out of a pack
    Toggle(ItemsArgs),

    /// Delete a pack (items are kept)
    Delete(PackRef),

    /// Weight breakdown by tag
    Analyze(AnalyzeArgs),

    /// Render a printable pack list
    Print(PrintArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Pack name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct PackRef {
    /// Pack name, id or id prefix
    pub pack: String,
}

#[derive(clap::Args, Debug)]
pub struct ItemsArgs {
    /// Pack name, id or id prefix
    pub pack: String,

    /// Item ids, id prefixes, @N aliases or exact names
    #[arg(required = true)]
    pub items: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Pack name, id or id prefix
    pub pack: String,

    /// Show the breakdown under TOP [MIDDLE]
    #[arg(long, num_args = 1..=2, value_name = "TAG")]
    pub drill: Vec<String>,

    /// Also ask for a short written summary
    #[arg(long)]
    pub summary: bool,

    /// Compute the breakdown locally without the AI collaborator
    #[arg(long)]
    pub local: bool,
}

#[derive(clap::Args, Debug)]
pub struct PrintArgs {
    /// Pack name, id or id prefix
    pub pack: String,

    /// Write to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Plain text instead of HTML
    #[arg(long)]
    pub text: bool,
}

pub fn run(cmd: PackCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PackCommands::New(args) => run_new(args, global),
        PackCommands::List => run_list(global),
        PackCommands::Show(args) => run_show(args, global),
        PackCommands::Add(args) => run_update(args, global, Update::Add),
        PackCommands::Remove(args) => run_update(args, global, Update::Remove),
        PackCommands::Toggle(args) => run_update(args, global, Update::Toggle),
        PackCommands::Delete(args) => run_delete(args, global),
        PackCommands::Analyze(args) => run_analyze(args, global),
        PackCommands::Print(args) => run_print(args, global),
    }
}

fn find_pack<'a>(packs: &'a PackBook, reference: &str) -> Result<&'a Pack> {
    packs
        .find(reference)
        .ok_or_else(|| miette::miette!(help = "see `gear pack list`", "pack not found: {}", reference))
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut packs = ws.store.load_packs();
    let pack = packs
        .create(&args.name)
        .ok_or_else(|| miette::miette!("a pack named '{}' already exists (or the name is empty)", args.name.trim()))?;
    let id = pack.id;
    ws.store.save_packs(&packs)?;

    tracing::info!(pack = %id, "created pack");
    success(global, format!("Created pack {} {}", style(&id).cyan(), style(args.name.trim()).yellow()));
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let inventory = ws.store.load_inventory();
    let packs = ws.store.load_packs();

    match ws.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&packs).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&packs).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Id => {
            for pack in packs.iter() {
                println!("{}", pack.id);
            }
            return Ok(());
        }
        _ => {}
    }

    if packs.is_empty() {
        println!("No packs yet.");
        println!();
        println!("Start one with: {}", style("gear pack new <NAME>").yellow());
        return Ok(());
    }

    println!(
        "{:<32} {:<24} {:>6}  {}",
        style("ID").bold(),
        style("NAME").bold(),
        style("ITEMS").bold(),
        style("TOTAL").bold()
    );
    println!("{}", "-".repeat(84));
    for pack in packs.iter() {
        println!(
            "{:<32} {:<24} {:>6}  {}",
            pack.id,
            truncate_str(&pack.name, 24),
            pack.packed_items(inventory.items()).len(),
            format_weight(pack.total_weight(inventory.items()))
        );
    }
    Ok(())
}

fn run_show(args: PackRef, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let inventory = ws.store.load_inventory();
    let packs = ws.store.load_packs();
    let pack = find_pack(&packs, &args.pack)?;

    let format = ws.format(global, OutputFormat::Tsv);
    if matches!(format, OutputFormat::Tsv | OutputFormat::Auto) {
        println!(
            "{} {}",
            style(&pack.name).bold(),
            style(format!("created {}", pack.created.format("%Y-%m-%d"))).dim()
        );
        println!();
    }
    print_items(&ws, &pack.packed_items(inventory.items()), format)
}

#[derive(Clone, Copy)]
enum Update {
    Add,
    Remove,
    Toggle,
}

fn resolve_items(ws: &Workspace, inventory: &Inventory, references: &[String]) -> Result<Vec<EntityId>> {
    references
        .iter()
        .map(|r| -> Result<EntityId> { Ok(inventory.find(&ws.resolve(r))?.id) })
        .collect()
}

fn run_update(args: ItemsArgs, global: &GlobalOpts, update: Update) -> Result<()> {
    let ws = Workspace::open(global)?;
    let inventory = ws.store.load_inventory();
    let mut packs = ws.store.load_packs();
    let ids = resolve_items(&ws, &inventory, &args.items)?;

    let pack = packs
        .find_mut(&args.pack)
        .ok_or_else(|| miette::miette!("pack not found: {}", args.pack))?;
    let mut changed = 0;
    for id in ids {
        let did = match update {
            Update::Add => pack.add(id),
            Update::Remove => pack.remove(&id),
            Update::Toggle => {
                pack.toggle(id);
                true
            }
        };
        if did {
            changed += 1;
        }
    }
    let name = pack.name.clone();
    let total = pack.total_weight(inventory.items());
    ws.store.save_packs(&packs)?;

    let verb = match update {
        Update::Add => "Added",
        Update::Remove => "Removed",
        Update::Toggle => "Toggled",
    };
    success(
        global,
        format!(
            "{} {} item(s) in {} (now {})",
            verb,
            changed,
            style(&name).yellow(),
            format_weight(total)
        ),
    );
    Ok(())
}

fn run_delete(args: PackRef, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut packs = ws.store.load_packs();
    let pack = packs
        .delete(&args.pack)
        .ok_or_else(|| miette::miette!("pack not found: {}", args.pack))?;
    ws.store.save_packs(&packs)?;

    success(global, format!("Deleted pack {}", style(&pack.name).yellow()));
    Ok(())
}

fn run_analyze(args: AnalyzeArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let inventory = ws.store.load_inventory();
    let packs = ws.store.load_packs();
    let pack = find_pack(&packs, &args.pack)?;
    let packed = pack.packed_items(inventory.items());

    let collaborator = ws.collaborator();
    let remote = if args.local || packed.is_empty() {
        None
    } else {
        collaborator.analyze_pack(&packed)
    };
    let analysis: PackAnalysis = remote.unwrap_or_else(|| {
        tracing::debug!("using local weight breakdown");
        weight_distribution(packed.iter().copied())
    });

    let path: Vec<&str> = args.drill.iter().map(String::as_str).collect();
    let slices = drill(&analysis.distribution, &path)
        .ok_or_else(|| miette::miette!("nothing to drill into at {}", args.drill.join(" > ")))?;

    let summary = if args.summary && !packed.is_empty() {
        collaborator.pack_summary(&analysis)
    } else {
        None
    };

    match ws.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            let mut value = serde_json::to_value(&analysis).into_diagnostic()?;
            if let Some(summary) = &summary {
                value["summary"] = serde_json::Value::String(summary.clone());
            }
            println!("{}", serde_json::to_string_pretty(&value).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&analysis).into_diagnostic()?);
            return Ok(());
        }
        _ => {}
    }

    println!(
        "{}  Total Weight: {}",
        style(&pack.name).bold(),
        style(format_weight(analysis.total_weight)).cyan()
    );
    if !path.is_empty() {
        println!("{}", style(path.join(" > ")).dim());
    }
    println!();

    if slices.is_empty() {
        println!("Nothing packed.");
    } else {
        let mut builder = Builder::default();
        builder.push_record(["Tag", "Weight", "Share"]);
        for slice in slices {
            builder.push_record([
                slice.tag.clone(),
                format!("{}g", slice.weight),
                format!("{:.1}%", slice.percentage),
            ]);
        }
        println!("{}", builder.build().with(Style::markdown()));
    }

    if args.summary {
        println!();
        match summary {
            Some(text) => println!("{}", text.trim()),
            None => println!("{} summary unavailable", style("!").yellow()),
        }
    }
    Ok(())
}

fn run_print(args: PrintArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let inventory = ws.store.load_inventory();
    let packs = ws.store.load_packs();
    let pack = find_pack(&packs, &args.pack)?;

    let list = PackList::build(pack, &inventory);
    let rendered = if args.text {
        list.to_text()
    } else {
        ReportRenderer::new()?.render_html(&list)?
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered).into_diagnostic()?;
            success(
                global,
                format!("Wrote pack list to {}", style(path.display()).cyan()),
            );
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
