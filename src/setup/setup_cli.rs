use blogo_backend::config::Config;
use blogo_backend::models::db_operations::posts_db_operations;
use blogo_backend::setup::db_setup;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "setup_cli", author, version, about = "A CLI for initial application setup.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    Uploads {
        #[command(subcommand)]
        action: UploadsAction,
    },
}

#[derive(Subcommand, Debug)]
enum DbAction {
    /// Create the posts database, table and indexes.
    Setup,
    /// Print how many posts are stored.
    Stats,
}

#[derive(Subcommand, Debug)]
enum UploadsAction {
    /// Create the upload directory.
    Setup,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env(&cli.env_file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match &cli.command {
        Commands::Db { action } => match action {
            DbAction::Setup => setup_posts_database(&config),
            DbAction::Stats => print_stats(&config),
        },
        Commands::Uploads { action } => match action {
            UploadsAction::Setup => setup_upload_dir(&config),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn setup_posts_database(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = config.posts_db_path();
    println!("⚙️ Setting up posts database at {}...", db_path.display());
    db_setup::open_posts_db(&db_path)?;
    println!("✅ Posts database is ready.");
    Ok(())
}

fn print_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = config.posts_db_path();
    if !db_path.exists() {
        return Err(format!(
            "posts.db not found at {}. Run 'setup_cli --env-file <path> db setup' first.",
            db_path.display()
        )
        .into());
    }
    let pool = db_setup::init_pool(&db_path)?;
    let conn = pool.get()?;
    let total = posts_db_operations::count_posts(&conn)?;
    println!("Stored posts: {}", total);
    Ok(())
}

fn setup_upload_dir(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let dir = config.upload_dir();
    fs::create_dir_all(&dir)?;
    println!("✅ Upload directory ready at {}", dir.display());
    Ok(())
}
