//! Attract-Mode romlist generation.
//!
//! One LaunchBox platform catalog becomes one `;`-delimited romlist under
//! `<attract>/romlists/<platform>.txt`. The mapping is an ordered table of
//! field records evaluated uniformly; anything per-conversion (currently
//! just the emulator name) travels in an explicit context, never in module
//! state.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::launchbox::{read_games, win_file_stem, Record};

/// Fixed Attract-Mode romlist header.
pub const ROMLIST_HEADER: &str = "#Name;Title;Emulator;CloneOf;Year;Manufacturer;Category;Players;Rotation;Control;Status;DisplayCount;DisplayType;AltRomname;AltTitle;Extra;Buttons";

/// Per-conversion inputs threaded through the field transforms.
#[derive(Debug, Clone, Copy)]
pub struct RomlistContext<'a> {
    /// Emulator name written into every row (the platform name by
    /// convention).
    pub emulator_name: &'a str,
}

type Transform = fn(&str, &RomlistContext<'_>) -> String;

/// One column of the romlist: an optional LaunchBox source tag, the
/// Attract-Mode column it feeds, and an optional value transform.
struct FieldMapping {
    source: Option<&'static str>,
    #[allow(dead_code)]
    target: &'static str,
    transform: Option<Transform>,
}

fn rom_stem(value: &str, _ctx: &RomlistContext<'_>) -> String {
    win_file_stem(value).to_string()
}

fn emulator_name(_value: &str, ctx: &RomlistContext<'_>) -> String {
    ctx.emulator_name.to_string()
}

fn year(value: &str, _ctx: &RomlistContext<'_>) -> String {
    value.chars().take(4).collect()
}

fn genre(value: &str, _ctx: &RomlistContext<'_>) -> String {
    value.replace(';', " / ")
}

/// Column table, in Attract-Mode header order.
const FIELD_MAP: &[FieldMapping] = &[
    FieldMapping { source: Some("ApplicationPath"), target: "Name", transform: Some(rom_stem) },
    FieldMapping { source: Some("Title"), target: "Title", transform: None },
    FieldMapping { source: None, target: "Emulator", transform: Some(emulator_name) },
    FieldMapping { source: None, target: "CloneOf", transform: None },
    FieldMapping { source: Some("ReleaseDate"), target: "Year", transform: Some(year) },
    FieldMapping { source: Some("Publisher"), target: "Manufacturer", transform: None },
    FieldMapping { source: Some("Genre"), target: "Category", transform: Some(genre) },
    FieldMapping { source: None, target: "Players", transform: None },
    FieldMapping { source: None, target: "Rotation", transform: None },
    FieldMapping { source: None, target: "Control", transform: None },
    FieldMapping { source: None, target: "Status", transform: None },
    FieldMapping { source: Some("PlayCount"), target: "DisplayCount", transform: None },
    FieldMapping { source: None, target: "DisplayType", transform: None },
    FieldMapping { source: None, target: "AltRomname", transform: None },
    FieldMapping { source: None, target: "AltTitle", transform: None },
    FieldMapping { source: None, target: "Extra", transform: None },
    FieldMapping { source: None, target: "Buttons", transform: None },
];

/// Render one game record as a romlist row.
fn format_row(game: &Record, ctx: &RomlistContext<'_>) -> String {
    let mut row = String::new();
    for field in FIELD_MAP {
        let value = field
            .source
            .and_then(|tag| game.get(tag))
            .map(String::as_str)
            .unwrap_or_default();
        let value = match field.transform {
            Some(transform) => transform(value, ctx),
            None => value.to_string(),
        };
        row.push_str(&value);
        row.push(';');
    }
    row
}

/// Convert one platform catalog into romlist text, rows sorted.
pub fn convert_platform(xml: &str, ctx: &RomlistContext<'_>) -> crate::error::Result<String> {
    let mut rows: Vec<String> = read_games(xml)?
        .iter()
        .map(|game| format_row(game, ctx))
        .collect();
    rows.sort();

    let mut output = String::from(ROMLIST_HEADER);
    output.push('\n');
    output.push_str(&rows.join("\n"));
    Ok(output)
}

/// Generate one romlist per platform catalog found under
/// `<launchbox>/Data/Platforms/`.
pub fn generate_romlists(launchbox_dir: &Path, attract_dir: &Path, dry_run: bool) -> Result<()> {
    let platforms_dir = launchbox_dir.join("Data").join("Platforms");
    let romlists_dir = attract_dir.join("romlists");

    let mut entries: Vec<_> = std::fs::read_dir(&platforms_dir)
        .with_context(|| format!("Failed to read platforms dir: {:?}", platforms_dir))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|e| e.eq_ignore_ascii_case("xml")).unwrap_or(false))
        .collect();
    entries.sort();

    if !dry_run {
        std::fs::create_dir_all(&romlists_dir)?;
    }

    for platform_xml in entries {
        let platform = platform_xml
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(platform = %platform, "extracting roms");

        let xml = std::fs::read_to_string(&platform_xml)?;
        let ctx = RomlistContext {
            emulator_name: &platform,
        };
        let output = convert_platform(&xml, &ctx)?;

        let romlist_path = romlists_dir.join(format!("{platform}.txt"));
        if dry_run {
            info!(path = %romlist_path.display(), "dry run, would write romlist");
        } else {
            debug!(path = %romlist_path.display(), "writing romlist");
            std::fs::write(&romlist_path, output)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(fields: &[(&str, &str)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn row_maps_all_columns() {
        let game = game(&[
            ("ApplicationPath", r"Games\SNES\Super Mario World (U).zip"),
            ("Title", "Super Mario World"),
            ("ReleaseDate", "1990-11-21T00:00:00-08:00"),
            ("Publisher", "Nintendo"),
            ("Genre", "Platform;Action"),
            ("PlayCount", "12"),
        ]);
        let ctx = RomlistContext {
            emulator_name: "Super Nintendo Entertainment System",
        };
        assert_eq!(
            format_row(&game, &ctx),
            "Super Mario World (U);Super Mario World;Super Nintendo Entertainment System;;1990;Nintendo;Platform / Action;;;;;12;;;;;;"
        );
    }

    #[test]
    fn missing_fields_stay_empty() {
        let game = game(&[("Title", "Mystery Game")]);
        let ctx = RomlistContext {
            emulator_name: "snes",
        };
        let row = format_row(&game, &ctx);
        assert!(row.starts_with(";Mystery Game;snes;"));
        // 17 columns, each terminated by a semicolon.
        assert_eq!(row.matches(';').count(), 17);
    }

    #[test]
    fn output_is_sorted_under_header() {
        let xml = r#"<?xml version="1.0"?>
<LaunchBox>
  <Game><ApplicationPath>b.zip</ApplicationPath><Title>Beta</Title></Game>
  <Game><ApplicationPath>a.zip</ApplicationPath><Title>Alpha</Title></Game>
</LaunchBox>"#;
        let ctx = RomlistContext {
            emulator_name: "snes",
        };
        let output = convert_platform(xml, &ctx).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], ROMLIST_HEADER);
        assert!(lines[1].starts_with("a;"));
        assert!(lines[2].starts_with("b;"));
    }

    #[test]
    fn header_matches_field_table() {
        let expected = format!(
            "#{}",
            FIELD_MAP
                .iter()
                .map(|f| f.target)
                .collect::<Vec<_>>()
                .join(";")
        );
        assert_eq!(ROMLIST_HEADER, expected);
    }

    #[test]
    fn emulator_comes_from_context_not_state() {
        let game = game(&[("Title", "X")]);
        let first = format_row(&game, &RomlistContext { emulator_name: "one" });
        let second = format_row(&game, &RomlistContext { emulator_name: "two" });
        assert!(first.contains(";one;"));
        assert!(second.contains(";two;"));
    }
}
