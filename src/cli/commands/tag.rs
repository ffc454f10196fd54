//! `gear tag` command - Tag hierarchy management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::io::Write;

use crate::cli::helpers::{parse_tag_ref, success, Workspace};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::collab::{self, ItemDetails, SuggestionBoard};
use crate::collab::prompt::is_hex_color;
use crate::core::store::InventoryStore;
use crate::entities::tag::{TagLevel, TagRef, Visuals};
use crate::inventory::aggregate::format_weight;

#[derive(Subcommand, Debug)]
pub enum TagCommands {
    /// Show the hierarchy with item counts and weights
    Tree,

    /// List tag names at one level
    List(ListArgs),

    /// Rename a tag; every item under it follows
    Rename(RenameArgs),

    /// Delete a tag, its subtree and every item under it
    Delete(DeleteArgs),

    /// Ask the AI collaborator for tag suggestions
    Suggest(SuggestArgs),

    /// Set or regenerate a tag's color and emoji
    Style(StyleArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Level to list (tt, mt, bt)
    #[arg(long, short = 'l', default_value = "tt")]
    pub level: TagLevel,

    /// Restrict to children of this Top Tag
    #[arg(long)]
    pub tt: Option<String>,

    /// Restrict to children of this Middle Tag
    #[arg(long)]
    pub mt: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RenameArgs {
    /// Tag path: TOP [MIDDLE [BASE]]
    #[arg(required = true, num_args = 1..=3)]
    pub tag: Vec<String>,

    /// New name
    #[arg(long)]
    pub to: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Tag path: TOP [MIDDLE [BASE]]
    #[arg(required = true, num_args = 1..=3)]
    pub tag: Vec<String>,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct SuggestArgs {
    /// Item name
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'b', default_value = "")]
    pub brand: String,

    #[arg(long, default_value = "")]
    pub notes: String,

    /// Already chosen Top Tag
    #[arg(long)]
    pub tt: Option<String>,

    /// Already chosen Middle Tag (needs --tt)
    #[arg(long, requires = "tt")]
    pub mt: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct StyleArgs {
    /// Tag path: TOP [MIDDLE [BASE]]
    #[arg(required = true, num_args = 1..=3)]
    pub tag: Vec<String>,

    /// Hex color, e.g. #2ecc71
    #[arg(long)]
    pub color: Option<String>,

    #[arg(long)]
    pub emoji: Option<String>,

    /// Ask the AI collaborator for new visuals
    #[arg(long, conflicts_with_all = ["color", "emoji"])]
    pub regenerate: bool,
}

pub fn run(cmd: TagCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TagCommands::Tree => run_tree(global),
        TagCommands::List(args) => run_list(args, global),
        TagCommands::Rename(args) => run_rename(args, global),
        TagCommands::Delete(args) => run_delete(args, global),
        TagCommands::Suggest(args) => run_suggest(args, global),
        TagCommands::Style(args) => run_style(args, global),
    }
}

fn run_tree(global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let inventory = ws.store.load_inventory();
    let tags = inventory.tags();

    match ws.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(tags).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(tags).into_diagnostic()?);
            return Ok(());
        }
        _ => {}
    }

    if tags.is_empty() {
        println!("No tags yet.");
        return Ok(());
    }

    for node in tags.walk() {
        let path = tags.path_of(&node.id);
        let Some(tag) = TagRef::from_segments(&path) else {
            continue;
        };
        let under: Vec<_> = inventory
            .items()
            .iter()
            .filter(|i| tag.covers(&i.path()))
            .collect();
        let weight: u64 = under.iter().map(|i| u64::from(i.weight)).sum();

        let indent = "  ".repeat(node.level.depth());
        let name = match node.level {
            TagLevel::Top => style(&node.name).bold().to_string(),
            TagLevel::Middle => style(&node.name).cyan().to_string(),
            TagLevel::Base => node.name.clone(),
        };
        let emoji = if node.level == TagLevel::Top {
            format!("{} ", node.visuals.emoji)
        } else {
            String::new()
        };
        println!(
            "{}{}{} {}",
            indent,
            emoji,
            name,
            style(format!("({} item(s), {})", under.len(), format_weight(weight))).dim()
        );
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let inventory = ws.store.load_inventory();
    let names = inventory
        .tags()
        .existing_names(args.level, args.tt.as_deref(), args.mt.as_deref());

    match ws.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names).into_diagnostic()?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&names).into_diagnostic()?),
        _ => {
            for name in names {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

fn run_rename(args: RenameArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut inventory = ws.store.load_inventory();
    let tag = parse_tag_ref(&args.tag)?;

    let updated = inventory.rename_tag(&tag, &args.to)?;
    ws.store.save_inventory(&inventory)?;

    success(
        global,
        format!(
            "Renamed {} {} to {} ({} item(s) updated)",
            tag.level().label(),
            style(tag.name()).yellow(),
            style(args.to.trim()).cyan(),
            updated
        ),
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut inventory = ws.store.load_inventory();
    let tag = parse_tag_ref(&args.tag)?;

    if inventory.tags().resolve(&tag).is_none() {
        return Err(miette::miette!("tag not found: {}", tag));
    }

    if !args.yes {
        let doomed = inventory
            .items()
            .iter()
            .filter(|i| tag.covers(&i.path()))
            .count();
        println!(
            "Deleting {} {} also deletes {} item(s) under it.",
            tag.level().label(),
            style(&tag).yellow(),
            doomed
        );
        print!("Proceed? [y/N] ");
        std::io::stdout().flush().into_diagnostic()?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).into_diagnostic()?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let removed = inventory.delete_tag(&tag)?;
    let removed_ids: Vec<_> = removed.iter().map(|i| i.id).collect();
    let mut packs = ws.store.load_packs();
    let dropped = packs.prune(&removed_ids);

    ws.store.save_inventory(&inventory)?;
    if dropped > 0 {
        ws.store.save_packs(&packs)?;
    }

    success(
        global,
        format!(
            "Deleted {} {} and {} item(s)",
            tag.level().label(),
            style(&tag).yellow(),
            removed.len()
        ),
    );
    Ok(())
}

fn run_suggest(args: SuggestArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let inventory = ws.store.load_inventory();
    let collaborator = ws.collaborator();
    if !collaborator.is_available() {
        return Err(miette::miette!(
            help = "set GEMINI_API_KEY or enable ai in .gear/config.yaml",
            "tag suggestions are unavailable"
        ));
    }

    let details = ItemDetails {
        name: args.name,
        brand: args.brand,
        notes: args.notes,
    };
    let mut board = SuggestionBoard::new(collaborator.as_ref());
    board.refresh(&details, inventory.tags());

    let mut levels: Vec<TagLevel> = TagLevel::all().to_vec();
    if let Some(tt) = &args.tt {
        board.select(TagLevel::Top, tt, &details, inventory.tags());
        levels.retain(|l| *l != TagLevel::Top);
    }
    if let Some(mt) = &args.mt {
        board.select(TagLevel::Middle, mt, &details, inventory.tags());
        levels.retain(|l| *l != TagLevel::Middle);
    }

    if ws.format(global, OutputFormat::Tsv) == OutputFormat::Json {
        let map: std::collections::BTreeMap<String, _> = levels
            .iter()
            .map(|l| (l.code().to_string(), board.suggestions(*l)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map).into_diagnostic()?);
        return Ok(());
    }

    for level in levels {
        println!("{}", style(format!("{} Tag", level.label())).bold());
        let suggestions = board.suggestions(level);
        if suggestions.is_empty() {
            println!("  {}", style("(no suggestions)").dim());
        }
        for s in suggestions {
            println!("  {:>3}%  {}", s.match_percentage, s.tag);
        }
    }
    Ok(())
}

fn run_style(args: StyleArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut inventory = ws.store.load_inventory();
    let tag = parse_tag_ref(&args.tag)?;

    let id = inventory
        .tags()
        .resolve(&tag)
        .ok_or_else(|| miette::miette!("tag not found: {}", tag))?;
    let current = inventory
        .tags()
        .node(&id)
        .map(|n| n.visuals.clone())
        .unwrap_or_default();

    let visuals = if args.regenerate {
        let collaborator = ws.collaborator();
        if !collaborator.is_available() {
            return Err(miette::miette!(
                help = "set GEMINI_API_KEY, or pass --color and --emoji",
                "cannot regenerate visuals without the AI collaborator"
            ));
        }
        collab::visuals_for(collaborator.as_ref(), tag.name(), tag.level())
    } else {
        if args.color.is_none() && args.emoji.is_none() {
            println!("{} {}", current.emoji, style(&current.color).dim());
            return Ok(());
        }
        if let Some(color) = &args.color {
            if !is_hex_color(color.trim()) {
                return Err(miette::miette!("not a hex color: {}", color));
            }
        }
        Visuals::new(
            args.color.map(|c| c.trim().to_string()).unwrap_or(current.color),
            args.emoji.map(|e| e.trim().to_string()).unwrap_or(current.emoji),
        )
    };

    inventory.set_tag_visuals(&tag, visuals.clone())?;
    ws.store.save_inventory(&inventory)?;

    success(
        global,
        format!("{} {} now {} {}", tag.level().label(), style(&tag).yellow(), visuals.emoji, visuals.color),
    );
    Ok(())
}
