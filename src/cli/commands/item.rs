//! `gear item` command - Gear item management

use clap::{Subcommand, ValueEnum};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, success, truncate_str, Workspace};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::collab::{Collaborator, ItemDetails, SuggestionBoard, TagSuggestion};
use crate::core::store::InventoryStore;
use crate::entities::item::{GearItem, ItemDraft};
use crate::entities::tag::TagLevel;
use crate::inventory::aggregate::format_weight;
use crate::inventory::catalog::Inventory;
use crate::inventory::search::{self, SearchBy};

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Add a piece of gear
    New(NewArgs),

    /// List gear with filtering
    List(ListArgs),

    /// Show one item's details
    Show(ShowArgs),

    /// Change an item's fields
    Edit(EditArgs),

    /// Remove an item (and drop it from every pack)
    Delete(DeleteArgs),

    /// Search by item name, brand or tag
    Search(SearchArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Item name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Brand name
    #[arg(long, short = 'b', default_value = "")]
    pub brand: String,

    /// Weight in grams
    #[arg(long, short = 'w')]
    pub weight: Option<u32>,

    /// Free-text notes
    #[arg(long, default_value = "")]
    pub notes: String,

    /// Top Tag
    #[arg(long)]
    pub tt: Option<String>,

    /// Middle Tag
    #[arg(long)]
    pub mt: Option<String>,

    /// Base Tag
    #[arg(long)]
    pub bt: Option<String>,

    /// Fill missing tags with the best AI suggestion
    #[arg(long)]
    pub suggest: bool,

    /// Prompt for every field, offering AI tag suggestions
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortField {
    Name,
    Brand,
    Weight,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only items under this Top Tag
    #[arg(long)]
    pub tt: Option<String>,

    /// Only items under this Middle Tag
    #[arg(long)]
    pub mt: Option<String>,

    /// Only items under this Base Tag
    #[arg(long)]
    pub bt: Option<String>,

    /// Sort order
    #[arg(long, default_value = "name")]
    pub sort: SortField,

    /// Reverse the sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Show at most N items
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Print only the number of matching items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Item id, id prefix, @N or exact name
    pub item: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Item id, id prefix, @N or exact name
    pub item: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub brand: Option<String>,

    #[arg(long)]
    pub weight: Option<u32>,

    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long)]
    pub tt: Option<String>,

    #[arg(long)]
    pub mt: Option<String>,

    #[arg(long)]
    pub bt: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Item id, id prefix, @N or exact name
    pub item: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SearchField {
    Item,
    Brand,
    Tag,
}

impl From<SearchField> for SearchBy {
    fn from(field: SearchField) -> Self {
        match field {
            SearchField::Item => SearchBy::Item,
            SearchField::Brand => SearchBy::Brand,
            SearchField::Tag => SearchBy::Tag,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Case-insensitive substring
    pub query: String,

    /// Field to match against
    #[arg(long, default_value = "item")]
    pub by: SearchField,
}

pub fn run(cmd: ItemCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ItemCommands::New(args) => run_new(args, global),
        ItemCommands::List(args) => run_list(args, global),
        ItemCommands::Show(args) => run_show(args, global),
        ItemCommands::Edit(args) => run_edit(args, global),
        ItemCommands::Delete(args) => run_delete(args, global),
        ItemCommands::Search(args) => run_search(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut inventory = ws.store.load_inventory();
    let collaborator = ws.collaborator();

    let draft = if args.interactive {
        run_wizard(&inventory, collaborator.as_ref())?
    } else {
        let mut draft = ItemDraft {
            name: args.name.unwrap_or_default(),
            brand: args.brand,
            weight: args.weight.unwrap_or(0),
            notes: args.notes,
            tt: args.tt.unwrap_or_default(),
            mt: args.mt.unwrap_or_default(),
            bt: args.bt.unwrap_or_default(),
        };
        if args.suggest {
            fill_with_suggestions(&mut draft, &inventory, collaborator.as_ref())?;
        }
        draft
    };

    let item = inventory.add_item(draft, collaborator.as_ref())?;
    ws.store.save_inventory(&inventory)?;

    success(
        global,
        format!(
            "Added {} {} ({})",
            style(&item.id).cyan(),
            style(&item.name).yellow(),
            item.path()
        ),
    );
    Ok(())
}

/// Fill empty tag levels top-down with the best suggestion
fn fill_with_suggestions(
    draft: &mut ItemDraft,
    inventory: &Inventory,
    collaborator: &dyn Collaborator,
) -> Result<()> {
    let missing = TagLevel::all()
        .into_iter()
        .any(|level| draft.path().segment(level).trim().is_empty());
    if !missing {
        return Ok(());
    }
    if !collaborator.is_available() {
        return Err(miette::miette!(
            help = "set GEMINI_API_KEY or pass --tt, --mt and --bt",
            "tag suggestions are unavailable"
        ));
    }

    SuggestionBoard::new(collaborator)
        .complete(draft, inventory.tags())
        .map_err(|level| miette::miette!("no {} suggestion came back", level.label()))
}

fn run_wizard(inventory: &Inventory, collaborator: &dyn Collaborator) -> Result<ItemDraft> {
    let theme = ColorfulTheme::default();

    let name: String = Input::with_theme(&theme)
        .with_prompt("Name")
        .interact_text()
        .into_diagnostic()?;
    let brand: String = Input::with_theme(&theme)
        .with_prompt("Brand")
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()?;
    let weight: u32 = Input::with_theme(&theme)
        .with_prompt("Weight (g)")
        .interact_text()
        .into_diagnostic()?;
    let notes: String = Input::with_theme(&theme)
        .with_prompt("Notes")
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()?;

    let mut draft = ItemDraft::new(name, brand, weight).with_notes(notes);
    let details = ItemDetails::from(&draft);
    // An offline board still tracks the chosen context for existing-name lookups
    let mut board = SuggestionBoard::new(collaborator);
    board.refresh(&details, inventory.tags());

    for level in TagLevel::all() {
        let context = board.context();
        let existing = inventory.tags().existing_names(
            level,
            context.tt.as_deref(),
            context.mt.as_deref(),
        );
        let chosen = pick_tag(&theme, level, &board.suggestions(level), &existing)?;
        *draft.segment_mut(level) = chosen.clone();
        if level != TagLevel::Base {
            board.select(level, &chosen, &details, inventory.tags());
        }
    }
    Ok(draft)
}

/// Choose a tag from suggestions, existing names, or free text
fn pick_tag(
    theme: &ColorfulTheme,
    level: TagLevel,
    suggestions: &[TagSuggestion],
    existing: &[String],
) -> Result<String> {
    let mut values: Vec<String> = suggestions.iter().map(|s| s.tag.clone()).collect();
    let mut labels: Vec<String> = suggestions
        .iter()
        .map(|s| format!("{} ({}%)", s.tag, s.match_percentage))
        .collect();
    for name in existing {
        if !values.contains(name) {
            values.push(name.clone());
            labels.push(name.clone());
        }
    }

    let prompt = format!("{} Tag", level.label());
    if !values.is_empty() {
        labels.push("Other...".to_string());
        let selection = Select::with_theme(theme)
            .with_prompt(&prompt)
            .items(&labels)
            .default(0)
            .interact()
            .into_diagnostic()?;
        if let Some(value) = values.get(selection) {
            return Ok(value.clone());
        }
    }

    Input::with_theme(theme)
        .with_prompt(&prompt)
        .interact_text()
        .into_diagnostic()
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let inventory = ws.store.load_inventory();

    let matches_tag = |value: &str, filter: &Option<String>| {
        filter
            .as_deref()
            .map_or(true, |f| value.eq_ignore_ascii_case(f.trim()))
    };
    let mut items: Vec<&GearItem> = inventory
        .items()
        .iter()
        .filter(|i| matches_tag(&i.tt, &args.tt))
        .filter(|i| matches_tag(&i.mt, &args.mt))
        .filter(|i| matches_tag(&i.bt, &args.bt))
        .collect();

    match args.sort {
        SortField::Name => {}
        SortField::Brand => items.sort_by_key(|i| i.brand.to_lowercase()),
        SortField::Weight => items.sort_by_key(|i| i.weight),
    }
    if args.reverse {
        items.reverse();
    }
    if let Some(limit) = args.limit {
        items.truncate(limit);
    }

    if args.count {
        println!("{}", items.len());
        return Ok(());
    }

    let format = ws.format(global, OutputFormat::Tsv);
    print_items(&ws, &items, format)
}

fn run_search(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let inventory = ws.store.load_inventory();
    let items = search::search(inventory.items(), &args.query, args.by.into());
    let format = ws.format(global, OutputFormat::Tsv);
    print_items(&ws, &items, format)
}

/// Print items in a list format and record their `@N` aliases
pub(crate) fn print_items(ws: &Workspace, items: &[&GearItem], format: OutputFormat) -> Result<()> {
    if items.is_empty() {
        match format {
            OutputFormat::Json | OutputFormat::Yaml => println!("[]"),
            OutputFormat::Tsv => {
                println!("No gear found.");
                println!();
                println!("Add some with: {}", style("gear item new").yellow());
            }
            _ => {}
        }
        return Ok(());
    }

    ws.remember(items.iter().map(|i| &i.id));

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&items).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            println!("id,name,brand,weight,tt,mt,bt,notes");
            for item in items {
                println!(
                    "{},{},{},{},{},{},{},{}",
                    item.id,
                    escape_csv(&item.name),
                    escape_csv(&item.brand),
                    item.weight,
                    escape_csv(&item.tt),
                    escape_csv(&item.mt),
                    escape_csv(&item.bt),
                    escape_csv(&item.notes)
                );
            }
        }
        OutputFormat::Id => {
            for item in items {
                println!("{}", item.id);
            }
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["#", "Name", "Brand", "Weight (g)", "Tags"]);
            for (n, item) in items.iter().enumerate() {
                builder.push_record([
                    format!("@{}", n + 1),
                    item.name.clone(),
                    item.brand.clone(),
                    item.weight.to_string(),
                    item.path().to_string(),
                ]);
            }
            println!("{}", builder.build().with(Style::markdown()));
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!(
                "{:<5} {:<30} {:<14} {:>8}  {}",
                style("#").bold(),
                style("NAME").bold(),
                style("BRAND").bold(),
                style("WEIGHT").bold(),
                style("TAGS").bold()
            );
            println!("{}", "-".repeat(90));
            for (n, item) in items.iter().enumerate() {
                println!(
                    "{:<5} {:<30} {:<14} {:>7}g  {}",
                    format!("@{}", n + 1),
                    truncate_str(&item.name, 30),
                    truncate_str(&item.brand, 14),
                    item.weight,
                    item.path()
                );
            }
            println!();
            let total: u64 = items.iter().map(|i| u64::from(i.weight)).sum();
            println!(
                "{} item(s), {}",
                style(items.len()).cyan(),
                format_weight(total)
            );
        }
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let inventory = ws.store.load_inventory();
    let item = inventory.find(&ws.resolve(&args.item))?;

    match ws.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(item).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => println!("{}", item.id),
        _ => {
            let emoji = inventory
                .tags()
                .top_visuals(&item.tt)
                .map(|v| v.emoji.as_str())
                .unwrap_or("");
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(&item.id).cyan());
            println!("{}: {}", style("Name").bold(), style(&item.name).yellow());
            if !item.brand.is_empty() {
                println!("{}: {}", style("Brand").bold(), item.brand);
            }
            println!("{}: {}", style("Weight").bold(), format_weight(u64::from(item.weight)));
            println!("{}: {} {}", style("Tags").bold(), emoji, item.path());
            println!("{}", style("─".repeat(60)).dim());
            if !item.notes.is_empty() {
                println!();
                println!("{}", item.notes);
            }
        }
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut inventory = ws.store.load_inventory();
    let current = inventory.find(&ws.resolve(&args.item))?.clone();

    let mut draft = current.to_draft();
    if let Some(name) = args.name {
        draft.name = name;
    }
    if let Some(brand) = args.brand {
        draft.brand = brand;
    }
    if let Some(weight) = args.weight {
        draft.weight = weight;
    }
    if let Some(notes) = args.notes {
        draft.notes = notes;
    }
    if let Some(tt) = args.tt {
        draft.tt = tt;
    }
    if let Some(mt) = args.mt {
        draft.mt = mt;
    }
    if let Some(bt) = args.bt {
        draft.bt = bt;
    }

    let collaborator = ws.collaborator();
    let item = inventory.edit_item(&current.id, draft, collaborator.as_ref())?;
    ws.store.save_inventory(&inventory)?;

    success(
        global,
        format!("Updated {} ({})", style(&item.name).yellow(), item.path()),
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut inventory = ws.store.load_inventory();
    let id = inventory.find(&ws.resolve(&args.item))?.id;

    let item = inventory.delete_item(&id)?;
    let mut packs = ws.store.load_packs();
    let dropped = packs.prune(&[item.id]);

    ws.store.save_inventory(&inventory)?;
    if dropped > 0 {
        ws.store.save_packs(&packs)?;
    }

    success(global, format!("Deleted {}", style(&item.name).yellow()));
    Ok(())
}
