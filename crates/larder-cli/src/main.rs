use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use larder_core::{
    Category, DriveClient, FetchClient, Recipe, RecipePipeline, RecipeStore, SqliteStore,
    SyncError, SyncReconciler,
};

#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Larder recipe manager", long_about = None)]
struct Cli {
    /// Path to the recipe database
    #[arg(long, env = "LARDER_DB", default_value = "larder.db", global = true)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a web page and extract a recipe from it
    Import {
        url: String,

        /// Save to the collection instead of just previewing
        #[arg(long)]
        save: bool,

        /// Override the extracted title
        #[arg(long)]
        title: Option<String>,

        /// Category to file the recipe under
        #[arg(long, default_value = "sweet")]
        category: Category,

        #[arg(long, default_value = "")]
        sub_category: String,

        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Add a manually authored recipe
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        category: Category,

        #[arg(long, default_value = "")]
        sub_category: String,

        #[arg(long)]
        image: Option<String>,

        /// Comma-separated ingredient lines
        #[arg(long, value_delimiter = ',')]
        ingredients: Option<Vec<String>>,

        /// Comma-separated instruction lines
        #[arg(long, value_delimiter = ',')]
        steps: Option<Vec<String>>,

        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// List recipes, optionally filtered
    List {
        #[arg(long)]
        category: Option<Category>,

        /// Tag substring to search for
        #[arg(long)]
        tag: Option<String>,
    },
    /// Show one recipe in full
    Show {
        title: String,
        #[arg(long)]
        category: Category,
    },
    /// Delete a recipe
    Delete {
        title: String,
        #[arg(long)]
        category: Category,
    },
    /// Upload the local collection to the remote folder
    Push {
        /// Bearer token for the remote store
        #[arg(long, env = "LARDER_TOKEN")]
        token: Option<String>,
    },
    /// Merge remote recipes into the local collection
    Pull {
        /// Bearer token for the remote store
        #[arg(long, env = "LARDER_TOKEN")]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let store = SqliteStore::open(&cli.db)
        .with_context(|| format!("Failed to open database {}", cli.db.display()))?;

    match cli.command {
        Commands::Import {
            url,
            save,
            title,
            category,
            sub_category,
            tags,
        } => {
            import(&store, &url, save, title, category, sub_category, tags).await?;
        }
        Commands::Add {
            title,
            category,
            sub_category,
            image,
            ingredients,
            steps,
            tags,
        } => {
            let recipe = Recipe {
                id: 0,
                title,
                image,
                ingredients,
                steps,
                url: String::new(),
                category,
                sub_category,
                tags,
            };
            let id = store.insert(&recipe).context("Failed to save recipe")?;
            println!("Saved \"{}\" (id {id})", recipe.title);
        }
        Commands::List { category, tag } => {
            let recipes = match (category, tag) {
                (_, Some(tag)) => {
                    let mut rows = store.by_tag(&tag).context("Tag search failed")?;
                    if let Some(category) = category {
                        rows.retain(|r| r.category == category);
                    }
                    rows
                }
                (Some(category), None) => store
                    .by_category(category)
                    .context("Category filter failed")?,
                (None, None) => store.all().context("Failed to read recipes")?,
            };
            if recipes.is_empty() {
                println!("No recipes");
            }
            for recipe in recipes {
                println!("{} [{}]", recipe.title, recipe.category);
            }
        }
        Commands::Show { title, category } => {
            match store.find(&title, category).context("Lookup failed")? {
                Some(recipe) => print_recipe(&recipe),
                None => println!("No recipe \"{title}\" in {category}"),
            }
        }
        Commands::Delete { title, category } => {
            if store.delete(&title, category).context("Delete failed")? {
                println!("Deleted \"{title}\"");
            } else {
                println!("No recipe \"{title}\" in {category}");
            }
        }
        Commands::Push { token } => {
            let reconciler = SyncReconciler::new(DriveClient::new(), store);
            match reconciler.push(token.as_deref()).await {
                Ok(outcome) => println!("{}", outcome.status_line()),
                Err(SyncError::NotAuthorized) => bail!("Not authorized"),
                Err(e) => bail!("Upload failed: {e}"),
            }
        }
        Commands::Pull { token } => {
            let reconciler = SyncReconciler::new(DriveClient::new(), store);
            match reconciler.pull(token.as_deref()).await {
                Ok(outcome) => println!("{}", outcome.status_line()),
                Err(SyncError::NotAuthorized) => bail!("Not authorized"),
                Err(e) => bail!("Sync failed: {e}"),
            }
        }
    }

    Ok(())
}

async fn import(
    store: &SqliteStore,
    url: &str,
    save: bool,
    title: Option<String>,
    category: Category,
    sub_category: String,
    tags: Vec<String>,
) -> Result<()> {
    let client = FetchClient::new().context("Failed to build HTTP client")?;
    let pipeline = RecipePipeline::new(client);

    let mut recipe = pipeline.import(url).await.context("Import failed")?;
    recipe.category = category;
    recipe.sub_category = sub_category;
    recipe.tags = tags;
    if let Some(title) = title {
        recipe.title = title;
    }

    print_recipe(&recipe);

    if save {
        if recipe.title.is_empty() {
            bail!("No title found on the page; re-run with --title");
        }
        let id = store.insert(&recipe).context("Failed to save recipe")?;
        println!("Saved \"{}\" (id {id})", recipe.title);
    } else {
        println!("(preview only; re-run with --save to keep it)");
    }

    Ok(())
}

fn print_recipe(recipe: &Recipe) {
    println!("{} [{}]", recipe.title, recipe.category);
    if !recipe.sub_category.is_empty() {
        println!("  {}", recipe.sub_category);
    }
    if !recipe.url.is_empty() {
        println!("  source: {}", recipe.url);
    }
    if let Some(image) = &recipe.image {
        println!("  image: {image}");
    }
    if !recipe.tags.is_empty() {
        println!("  tags: {}", recipe.tags.join(", "));
    }
    match &recipe.ingredients {
        Some(lines) => {
            println!("  ingredients:");
            for line in lines {
                println!("    - {line}");
            }
        }
        None => println!("  ingredients: (none found)"),
    }
    match &recipe.steps {
        Some(lines) => {
            println!("  steps:");
            for (i, line) in lines.iter().enumerate() {
                println!("    {}. {line}", i + 1);
            }
        }
        None => println!("  steps: (none found)"),
    }
}
