//! Schema introspection
//!
//! Lists the declared collections and prints the field contract of a
//! collection's schema, so record authors don't need to read raw JSON Schema.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::Value;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::SchemaVersion;
use crate::schema::collection::{CollectionRegistry, CHARACTERS};
use crate::schema::registry::SchemaRegistry;

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// List declared collections and their schema versions
    List,

    /// Show the fields of a collection's schema
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
#[command(disable_version_flag = true)]
pub struct ShowArgs {
    /// Collection name
    #[arg(default_value = CHARACTERS)]
    pub collection: String,

    /// Schema version (default: the collection's current version)
    #[arg(long)]
    pub version: Option<SchemaVersion>,

    /// Show raw JSON schema instead of formatted summary
    #[arg(long)]
    pub raw: bool,
}

pub fn run(cmd: SchemaCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SchemaCommands::List => list_schemas(global),
        SchemaCommands::Show(args) => show_schema(args),
    }
}

fn list_schemas(global: &GlobalOpts) -> Result<()> {
    let collections = CollectionRegistry::default();
    let schemas = SchemaRegistry::default();

    if global.format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(&collections).into_diagnostic()?;
        println!("{}", json);
        return Ok(());
    }

    println!("{:<14} {:<8} {:<8} {}", "COLLECTION", "TYPE", "CURRENT", "VERSIONS");
    println!("{}", "-".repeat(50));

    for collection in collections.iter() {
        let versions: Vec<String> = schemas
            .versions(&collection.name)
            .iter()
            .map(|v| v.to_string())
            .collect();
        println!(
            "{:<14} {:<8} {:<8} {}",
            collection.name,
            collection.kind.to_string(),
            collection.current.to_string(),
            versions.join(", ")
        );
    }

    println!("\nUse 'codex schema show <collection>' for field details");
    Ok(())
}

fn show_schema(args: ShowArgs) -> Result<()> {
    let collections = CollectionRegistry::default();
    let collection = collections.require(&args.collection).map_err(|e| {
        let known: Vec<&str> = collections.names().collect();
        miette::miette!("{} (known: {})", e, known.join(", "))
    })?;

    let version = args.version.unwrap_or(collection.current);
    let schemas = SchemaRegistry::default();
    let Some(content) = schemas.get(&collection.name, version) else {
        return Err(miette::miette!(
            "No {} schema for collection '{}'",
            version,
            collection.name
        ));
    };

    if args.raw {
        println!("{}", content);
        return Ok(());
    }

    let schema: Value = serde_json::from_str(content).into_diagnostic()?;

    let title = schema["title"].as_str().unwrap_or(&collection.name);
    println!("{}", style(title).bold());
    println!("{}", "=".repeat(title.chars().count()));
    if let Some(desc) = schema["description"].as_str() {
        println!("{}\n", desc);
    }

    println!("Fields:");
    println!("{:<24} {:<12} {:<5} {}", "NAME", "TYPE", "REQ", "DEFAULT");
    println!("{}", "-".repeat(56));
    print_fields(&schema, &schema, "");

    println!("\nUse --raw for full JSON schema");
    Ok(())
}

/// Print an object's properties, descending into nested objects and `$ref`s
fn print_fields(root: &Value, schema: &Value, prefix: &str) {
    let schema = resolve_ref(root, schema);
    let Some(props) = schema["properties"].as_object() else {
        return;
    };
    let required: Vec<&str> = schema["required"]
        .as_array()
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    for (name, prop) in props {
        let full_name = format!("{}{}", prefix, name);
        let resolved = resolve_ref(root, prop);
        let is_required = if required.contains(&name.as_str()) { "yes" } else { "" };
        let default = resolved
            .get("default")
            .map(|d| d.to_string())
            .unwrap_or_default();

        println!(
            "{:<24} {:<12} {:<5} {}",
            full_name,
            get_type_str(resolved),
            is_required,
            default
        );

        if resolved["type"] == "object" {
            print_fields(root, resolved, &format!("{}.", full_name));
        }
    }
}

/// Follow a local `#/...` reference, if the schema is one
fn resolve_ref<'a>(root: &'a Value, schema: &'a Value) -> &'a Value {
    schema["$ref"]
        .as_str()
        .and_then(|r| r.strip_prefix('#'))
        .and_then(|pointer| root.pointer(pointer))
        .unwrap_or(schema)
}

fn get_type_str(prop: &Value) -> String {
    if let Some(t) = prop["type"].as_str() {
        if t == "array" {
            if let Some(items_type) = prop["items"]["type"].as_str() {
                return format!("{}[]", items_type);
            }
            return "array".to_string();
        }
        return t.to_string();
    }
    "any".to_string()
}
