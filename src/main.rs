mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use romforge::convert::emulator::EmulatorOptions;
use romforge::scraper::{LookupRequest, MediaMap, ScraperClient};
use romforge::{artwork, config, convert, scraper};

fn build_client(config: &config::Config) -> Result<ScraperClient> {
    if !config.credentials.is_complete() {
        anyhow::bail!(
            "ScreenScraper credentials are not configured; add a [credentials] section to romforge.toml"
        );
    }
    Ok(ScraperClient::new(
        config.credentials.clone(),
        &config.scraper,
    ))
}

fn print_media(map: &MediaMap) {
    for (category, locales) in map {
        for (locale, kinds) in locales {
            for (kind, value) in kinds {
                println!("{category} ({locale}) {}: {value}", kind.as_str());
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "romforge=trace,reqwest=debug".to_string()
        } else {
            "romforge=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .init();

    match cli.command {
        Commands::Scrape {
            system_id,
            rom,
            title,
            rom_type,
            force_refresh,
            media,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let client = build_client(&config)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                let body = client
                    .lookup(LookupRequest {
                        system_id: &system_id,
                        rom_path: &rom,
                        title: title.as_deref(),
                        rom_type: rom_type.as_deref(),
                        force_refresh,
                    })
                    .await?;
                if media {
                    match scraper::extract_media(&body)? {
                        Some(map) => print_media(&map),
                        None => println!("No media available."),
                    }
                } else {
                    println!("{body}");
                }
                Ok(())
            })
        }
        Commands::Systems { force_refresh } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let client = build_client(&config)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                let systems = client.system_list(force_refresh).await?;
                for (name, id) in &systems {
                    println!("{id:>5}  {name}");
                }
                Ok(())
            })
        }
        Commands::UserInfo => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let client = build_client(&config)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                let info = client.user_info().await?;
                for (field, value) in &info {
                    println!("{field}: {value}");
                }
                Ok(())
            })
        }
        Commands::Romlists {
            launchbox_dir,
            attract_dir,
            dry_run,
        } => convert::romlist::generate_romlists(&launchbox_dir, &attract_dir, dry_run),
        Commands::Emulators {
            launchbox_dir,
            attract_dir,
            dry_run,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let opts = EmulatorOptions {
                rom_extensions: &config.convert.rom_extensions,
                rocketlauncher: config.convert.rocketlauncher.as_deref(),
            };
            convert::emulator::generate_emulators(&launchbox_dir, &attract_dir, &opts, dry_run)
        }
        Commands::RenameArt {
            launchbox_dir,
            attract_dir,
            dry_run,
        } => artwork::rename_artwork(&launchbox_dir, &attract_dir, dry_run),
        Commands::MergeArt {
            launchbox_dir,
            attract_dir,
            dry_run,
        } => artwork::merge_artwork(&launchbox_dir, &attract_dir, dry_run),
        Commands::Validate { config } => {
            let path = config.or(cli.config);
            let loaded = config::load_config_or_default(path.as_deref())?;
            println!(
                "Configuration OK (cache dir: {})",
                loaded.scraper.cache_dir.display()
            );
            Ok(())
        }
    }
}
