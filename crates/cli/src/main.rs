use clap::{ArgAction, Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use datacleaner_core::{
    category::DEFAULT_CATEGORIES, clean::DataCleaner, validate::normalize_category,
};
use datacleaner_server::Server;
use datacleaner_storage_ephemeral::EphemeralCategories;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[derive(Parser, Debug)]
#[command(name = "datacleaner", version, about = "Category data cleaning service")]
struct Cli {
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the category and data endpoints over HTTP.
    Serve(ServeArgs),
    /// Clean a data file and print the result as JSON.
    Clean(CleanArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, value_name = "ADDR", help = "Bind address [default: 127.0.0.1:8080]")]
    addr: Option<String>,
    #[arg(
        long = "category",
        action = ArgAction::Append,
        value_name = "NAME",
        help = "Initial valid category (repeatable); replaces the default set"
    )]
    categories: Vec<String>,
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// JSON array or JSON Lines file of category/subcategory pairs.
    #[arg(long)]
    from: PathBuf,
    #[arg(
        long = "category",
        action = ArgAction::Append,
        value_name = "NAME",
        help = "Valid category (repeatable); replaces the default set"
    )]
    categories: Vec<String>,
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ServeSection {
    addr: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct StoreSection {
    categories: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct AppConfig {
    #[serde(default)]
    serve: Option<ServeSection>,
    #[serde(default)]
    store: Option<StoreSection>,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    let cfg = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Serve(args) => serve(args, &cfg).await?,
        Commands::Clean(args) => clean_cmd(args, &cfg)?,
    }
    Ok(())
}

async fn serve(args: ServeArgs, cfg: &AppConfig) -> Result<()> {
    let addr = args
        .addr
        .or_else(|| cfg.serve.as_ref().and_then(|s| s.addr.clone()))
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());
    let store = build_store(args.categories, cfg)?;
    info!(%addr, categories = store.len(), "starting server");
    let server = Server::new(store);
    if let Err(e) = server.run_http(&addr).await {
        tracing::error!(error = %e, "http server exited with error");
        return Err(eyre!("http server failed: {}", e));
    }
    Ok(())
}

fn clean_cmd(args: CleanArgs, cfg: &AppConfig) -> Result<()> {
    let pairs = datacleaner_compat::load_pairs_from_path(&args.from)
        .map_err(|e| eyre!("failed to read {}: {}", args.from.display(), e))?;
    let store = build_store(args.categories, cfg)?;
    let cleaner = DataCleaner::new(Arc::new(store));
    let response = cleaner.process(Some(pairs.as_slice()))?;
    info!(
        received = pairs.len(),
        kept = response.categories.len(),
        "cleaned data file"
    );
    let out = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{out}");
    Ok(())
}

/// CLI categories win over configured ones; the built-in list is the fallback.
fn build_store(cli_categories: Vec<String>, cfg: &AppConfig) -> Result<EphemeralCategories> {
    let raw = if !cli_categories.is_empty() {
        cli_categories
    } else if let Some(configured) = cfg.store.as_ref().and_then(|s| s.categories.clone()) {
        configured
    } else {
        return Ok(EphemeralCategories::with_categories(
            DEFAULT_CATEGORIES.iter().copied(),
        ));
    };
    let names = raw
        .iter()
        .map(|c| normalize_category(Some(c.as_str())))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| eyre!("invalid category in configuration: {}", e))?;
    Ok(EphemeralCategories::with_categories(names))
}

fn load_config(path: Option<&str>) -> Result<AppConfig> {
    let mut builder = config::Config::builder().add_source(
        config::Environment::with_prefix("DATACLEANER")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("store.categories")
            .try_parsing(true),
    );

    if let Some(raw) = path {
        let expanded = expand_path(raw);
        if !expanded.exists() {
            tracing::warn!(
                path = expanded.display().to_string(),
                "config file not found; continuing with defaults and env overrides"
            );
        }
        builder = builder.add_source(config::File::from(expanded).required(false));
    }

    let cfg = builder
        .build()
        .map_err(|e| eyre!("config load error: {}", e))?;
    cfg.try_deserialize()
        .map_err(|e| eyre!("config parse error: {}", e))
}

fn expand_path(input: &str) -> PathBuf {
    expand_path_with_home(input, home_dir())
}

fn expand_path_with_home(input: &str, home: Option<PathBuf>) -> PathBuf {
    if input == "~" {
        return home.unwrap_or_else(|| PathBuf::from(input));
    }
    if let Some(rest) = input.strip_prefix("~/") {
        return home
            .map(|mut base| {
                base.push(rest);
                base
            })
            .unwrap_or_else(|| PathBuf::from(rest));
    }
    PathBuf::from(input)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
}
