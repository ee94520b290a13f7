//! # recipe-browser binary
//!
//! Assembles the remote gateway, local saved-recipe store and catalog from
//! configuration, then runs one command against them.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use configs::{AppConfig, LogConfig, LogFormat};
use rc_core::{
    select, CollectionGateway, Favorites, Food, KeyValueStore, ListQuery, Recipe, RecipeCatalog,
    SortKey,
};
use rc_remote_rest::{RemoteClient, RestCollectionGateway};
use rc_storage_local::LocalKeyValueStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recipe-browser", version, about = "Browse, search and save recipes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List recipes (or foods) matching a search, category and sort order
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "All")]
        category: String,
        #[arg(long, default_value_t = SortKey::Popular)]
        sort: SortKey,
        #[arg(long)]
        foods: bool,
    },
    /// Show one recipe
    Show { id: String },
    /// Save or unsave a recipe
    Save { id: String },
    /// List saved recipes
    Saved,
    /// Delete a recipe (or food) from the remote collection
    Delete {
        id: String,
        #[arg(long)]
        foods: bool,
    },
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.compact().init(),
    }
}

fn print_recipe(recipe: &Recipe) {
    let rating = recipe
        .rating
        .map(|r| format!("{r:.1}"))
        .unwrap_or_else(|| "-".to_string());
    let saved = if recipe.is_favorited { "*" } else { " " };
    println!(
        "{saved} {:<6} {:<40} {:<10} {:>4}  {}",
        recipe.id, recipe.title, recipe.duration, rating, recipe.category
    );
}

fn print_food(food: &Food) {
    let calories = food
        .calories
        .map(|c| format!("{c:.0} kcal"))
        .unwrap_or_default();
    println!("  {:<6} {:<40} {:<12} {}", food.id, food.name, food.category, calories);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Configuration and logging
    let cfg = AppConfig::load()?;
    init_tracing(&cfg.log);

    // 2. One shared remote handle for every collection
    let client = Arc::new(RemoteClient::new(
        cfg.remote.url.clone(),
        &cfg.remote.anon_key,
        Duration::from_secs(cfg.remote.timeout_secs),
    )?);
    tracing::info!(endpoint = client.base_url(), "remote client ready");

    // 3. Local saved-recipe storage
    let store: Arc<dyn KeyValueStore> = Arc::new(LocalKeyValueStore::new(cfg.storage.dir.clone()));

    let recipes: Arc<dyn CollectionGateway<Recipe>> =
        Arc::new(RestCollectionGateway::<Recipe>::new(Arc::clone(&client)));
    let foods = RestCollectionGateway::<Food>::new(client);
    let catalog = RecipeCatalog::new(Arc::clone(&recipes), Favorites::new(store));

    match cli.command {
        Command::List {
            search,
            category,
            sort,
            foods: false,
        } => {
            let query = ListQuery::new(search, category.as_str(), sort);
            for recipe in catalog.browse(&query).await? {
                print_recipe(&recipe);
            }
        }
        Command::List {
            search,
            category,
            sort,
            foods: true,
        } => {
            let query = ListQuery::new(search, category.as_str(), sort);
            let all = foods.get_all().await?;
            for food in select(&all, &query) {
                print_food(food);
            }
        }
        Command::Show { id } => {
            let recipe = catalog.detail(&id).await?;
            print_recipe(&recipe);
            if let Some(difficulty) = recipe.difficulty {
                println!("  difficulty: {difficulty}");
            }
            if !recipe.image_url.is_empty() {
                println!("  image:      {}", recipe.image_url);
            }
        }
        Command::Save { id } => {
            let saved = catalog.toggle_saved(&id).await?;
            println!("{id} {}", if saved { "saved" } else { "removed from saved" });
        }
        Command::Saved => {
            for recipe in catalog.saved().await? {
                print_recipe(&recipe);
            }
        }
        Command::Delete { id, foods: false } => {
            recipes.delete(&id).await?;
            println!("deleted recipe {id}");
        }
        Command::Delete { id, foods: true } => {
            foods.delete(&id).await?;
            println!("deleted food {id}");
        }
    }

    Ok(())
}
