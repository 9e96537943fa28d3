use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "romforge")]
#[command(author, version, about = "Game-library conversion and metadata scraping tool")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up game metadata for a single rom file
    Scrape {
        /// ScreenScraper system id (e.g. 4 for the SNES)
        system_id: String,

        /// Rom file to identify
        #[arg(required = true)]
        rom: PathBuf,

        /// Human-readable game title, used as a last-resort lookup name
        #[arg(long)]
        title: Option<String>,

        /// Rom type hint passed to the service
        #[arg(long)]
        rom_type: Option<String>,

        /// Skip the cache and re-query the service
        #[arg(long)]
        force_refresh: bool,

        /// Print the extracted media-asset map instead of the raw response
        #[arg(long)]
        media: bool,
    },

    /// Fetch the list of systems known to the service
    Systems {
        /// Skip the cache and re-query the service
        #[arg(long)]
        force_refresh: bool,
    },

    /// Show the authenticated user's profile
    UserInfo,

    /// Generate Attract-Mode romlists from LaunchBox catalogs
    Romlists {
        /// Base directory of LaunchBox
        launchbox_dir: PathBuf,

        /// Base directory of Attract-Mode
        attract_dir: PathBuf,

        /// Show what would be done without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate Attract-Mode emulator configs from LaunchBox data
    Emulators {
        /// Base directory of LaunchBox
        launchbox_dir: PathBuf,

        /// Base directory of Attract-Mode
        attract_dir: PathBuf,

        /// Show what would be done without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Rename LaunchBox artwork to the rom-based names Attract-Mode expects
    RenameArt {
        /// Base directory of LaunchBox
        launchbox_dir: PathBuf,

        /// Base directory of Attract-Mode
        attract_dir: PathBuf,

        /// Show what would be done without renaming anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Move artwork from Attract-Mode's scraper directory into LaunchBox
    MergeArt {
        /// Base directory of LaunchBox
        launchbox_dir: PathBuf,

        /// Base directory of Attract-Mode
        attract_dir: PathBuf,

        /// Show what would be done without moving anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}
