mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use pixly_core::config::Config;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from --verbose.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "pixly=debug,pixly_server=debug,pixly_db=debug,tower_http=debug".to_string()
        } else {
            "pixly=info,pixly_server=info,pixly_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve {
            host,
            port,
            database_url,
        } => {
            let mut config = Config::load_or_default(cli.config.as_deref());
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(url) = database_url {
                config.database.url = url;
            }

            tracing::info!("Starting pixly {}", env!("CARGO_PKG_VERSION"));
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(pixly_server::start(config))?;
            Ok(())
        }
        Commands::Migrate { database_url } => {
            let mut config = Config::load_or_default(cli.config.as_deref());
            if let Some(url) = database_url {
                config.database.url = url;
            }
            migrate(&config.database.url)
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("pixly {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn migrate(url: &str) -> Result<()> {
    // Opening the pool applies pending migrations.
    let pool = pixly_db::pool::init_from_url(url)?;
    let conn = pixly_db::pool::get_conn(&pool)?;
    let version = pixly_db::migrations::current_version(&conn)?;
    println!(
        "Database {url} at schema version {version} (latest {})",
        pixly_db::migrations::latest_version()
    );
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            Config::load(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    let warnings = config.validate();
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.database.url);
    println!(
        "  Storage: {:?} at {} (served under {})",
        config.storage.backend,
        config.storage.root.display(),
        config.storage.public_base_url
    );
    println!("  Catalog page size: {}", config.catalog.page_size);

    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        for warning in &warnings {
            println!("! {warning}");
        }
    }
    Ok(())
}
