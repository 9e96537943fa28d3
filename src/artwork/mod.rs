//! Artwork maintenance between LaunchBox and Attract-Mode.
//!
//! LaunchBox names scraped images after the game *title*; Attract-Mode
//! looks them up by rom file name. `rename_artwork` bridges the two by
//! renaming title-based files in place. `merge_artwork` moves images the
//! Attract-Mode scraper downloaded into the LaunchBox image tree so both
//! frontends share one copy.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::convert::{art_directories, read_games, win_file_stem};

/// Characters LaunchBox replaces with `_` when writing image file names.
const LB_FILE_SUBSTITUTIONS: &[char] =
    &[':', '\'', '\\', '/', '"', '?', '<', '>', '!', '|'];

/// Image file name LaunchBox gives the first scraped image of a title.
fn image_prefix(title: &str) -> String {
    let mut sanitized = title.to_string();
    for c in LB_FILE_SUBSTITUTIONS {
        sanitized = sanitized.replace(*c, "_");
    }
    format!("{sanitized}-01.")
}

/// Rename title-based LaunchBox artwork to rom-based names, for every
/// platform that has a generated romlist.
pub fn rename_artwork(launchbox_dir: &Path, attract_dir: &Path, dry_run: bool) -> Result<()> {
    let romlists_dir = attract_dir.join("romlists");
    let entries = std::fs::read_dir(&romlists_dir)
        .with_context(|| format!("Failed to read romlists dir: {:?}", romlists_dir))?;

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.extension().map(|e| e != "txt").unwrap_or(true) {
            continue;
        }
        let platform = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(platform = %platform, "renaming artwork");
        rename_platform_artwork(launchbox_dir, &platform, dry_run)?;
    }

    Ok(())
}

fn rename_platform_artwork(launchbox_dir: &Path, platform: &str, dry_run: bool) -> Result<()> {
    let platform_xml = launchbox_dir
        .join("Data")
        .join("Platforms")
        .join(format!("{platform}.xml"));
    let xml = std::fs::read_to_string(&platform_xml)
        .with_context(|| format!("Failed to read platform catalog: {:?}", platform_xml))?;

    let art_dirs: Vec<_> = art_directories(launchbox_dir, platform)
        .into_iter()
        .flat_map(|(_, dirs)| dirs)
        .collect();

    for game in read_games(&xml)? {
        let (Some(app_path), Some(title)) = (game.get("ApplicationPath"), game.get("Title"))
        else {
            continue;
        };
        let rom_stem = win_file_stem(app_path);
        let prefix = image_prefix(title);

        for dir in &art_dirs {
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.filter_map(|e| e.ok()) {
                let name = entry.file_name().to_string_lossy().into_owned();
                let Some(ext) = name.strip_prefix(&prefix) else {
                    continue;
                };
                let target = dir.join(format!("{rom_stem}.{ext}"));
                if dry_run {
                    info!(from = %entry.path().display(), to = %target.display(), "dry run, would rename");
                } else {
                    debug!(from = %entry.path().display(), to = %target.display(), "renaming");
                    std::fs::rename(entry.path(), &target)?;
                }
            }
        }
    }

    Ok(())
}

/// Attract-Mode scraper subdirectory → LaunchBox image directory.
const SCRAPER_TO_IMAGES: &[(&str, &str)] = &[
    ("flyer", "Box - Front"),
    ("marquee", "Banner"),
    ("wheel", "Clear Logo"),
    ("fanart", "Fanart - Background"),
];

/// Move artwork the Attract-Mode scraper downloaded into the LaunchBox
/// image tree. Files already present on the LaunchBox side are left alone.
pub fn merge_artwork(launchbox_dir: &Path, attract_dir: &Path, dry_run: bool) -> Result<()> {
    let scraper_dir = attract_dir.join("scraper");
    let platforms = std::fs::read_dir(&scraper_dir)
        .with_context(|| format!("Failed to read scraper dir: {:?}", scraper_dir))?;

    for entry in platforms.filter_map(|e| e.ok()) {
        if !entry.path().is_dir() {
            continue;
        }
        let platform = entry.file_name().to_string_lossy().into_owned();

        for (scraper_name, images_name) in SCRAPER_TO_IMAGES {
            let source_dir = scraper_dir.join(&platform).join(scraper_name);
            let target_dir = launchbox_dir.join("Images").join(&platform).join(images_name);

            let Ok(images) = std::fs::read_dir(&source_dir) else {
                continue;
            };
            for image in images.filter_map(|e| e.ok()) {
                let target = target_dir.join(image.file_name());
                if target.is_file() {
                    continue;
                }
                if dry_run {
                    info!(from = %image.path().display(), to = %target.display(), "dry run, would move");
                    continue;
                }
                std::fs::create_dir_all(&target_dir)?;
                move_file(&image.path(), &target)?;
            }
        }
    }

    Ok(())
}

/// Rename, falling back to copy-and-delete across filesystems.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    debug!(from = %from.display(), to = %to.display(), "moving");
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)?;
    if let Err(err) = std::fs::remove_file(from) {
        warn!(path = %from.display(), error = %err, "failed to remove source after copy");
    }
    Ok(())
}
