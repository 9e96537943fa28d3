//! Attract-Mode emulator config generation.
//!
//! LaunchBox splits emulator definitions (`Emulator` records) from their
//! platform assignments (`EmulatorPlatform` records), cross-referenced by
//! id. Each default platform assignment becomes one
//! `<attract>/emulators/<platform>.cfg` with the executable, launch
//! arguments, deduplicated rom paths and the artwork search stanza.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::launchbox::{read_records, win_dir_name, Record};
use super::art_directories;

/// Inputs that do not come from the LaunchBox data itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmulatorOptions<'a> {
    /// Rom extension list written to every config, `;`-separated.
    pub rom_extensions: &'a str,
    /// Launch through RocketLauncher instead of the platform emulator.
    pub rocketlauncher: Option<&'a Path>,
}

/// Generate one emulator config per default `EmulatorPlatform` record in
/// `<launchbox>/Data/Emulators.xml`.
pub fn generate_emulators(
    launchbox_dir: &Path,
    attract_dir: &Path,
    opts: &EmulatorOptions<'_>,
    dry_run: bool,
) -> Result<()> {
    let emulators_path = launchbox_dir.join("Data").join("Emulators.xml");
    let xml = std::fs::read_to_string(&emulators_path)
        .with_context(|| format!("Failed to read emulators file: {:?}", emulators_path))?;

    let emulators: HashMap<String, Record> = read_records(&xml, "Emulator")?
        .into_iter()
        .filter_map(|record| record.get("ID").cloned().map(|id| (id, record)))
        .collect();

    let emulators_dir = attract_dir.join("emulators");
    if !dry_run {
        std::fs::create_dir_all(&emulators_dir)?;
    }

    for assignment in read_records(&xml, "EmulatorPlatform")? {
        if assignment.get("Default").map(String::as_str) != Some("true") {
            continue;
        }
        let Some(platform) = assignment.get("Platform") else {
            continue;
        };
        let Some(emulator) = assignment
            .get("Emulator")
            .and_then(|id| emulators.get(id))
        else {
            warn!(platform = %platform, "no emulator record for platform assignment");
            continue;
        };
        info!(platform = %platform, "creating emulator config");

        let cfg = render_config(launchbox_dir, attract_dir, platform, emulator, &assignment, opts)?;
        let cfg_path = emulators_dir.join(format!("{platform}.cfg"));
        if dry_run {
            info!(path = %cfg_path.display(), "dry run, would write emulator config");
        } else {
            std::fs::write(&cfg_path, cfg)?;
        }
    }

    Ok(())
}

fn render_config(
    launchbox_dir: &Path,
    attract_dir: &Path,
    platform: &str,
    emulator: &Record,
    assignment: &Record,
    opts: &EmulatorOptions<'_>,
) -> Result<String> {
    let (executable, args, rompath) = if let Some(rl) = opts.rocketlauncher {
        let attract_exe = attract_dir.join("attract.exe");
        (
            rl.to_string_lossy().into_owned(),
            format!(
                "-s \"[emulator]\" -r \"[name]\" -p AttractMode -f \"{}\"",
                attract_exe.display()
            ),
            String::new(),
        )
    } else {
        let app_path = emulator
            .get("ApplicationPath")
            .map(String::as_str)
            .unwrap_or_default();
        (
            absolutize(launchbox_dir, app_path),
            build_args(emulator, assignment),
            rom_paths(launchbox_dir, platform)?,
        )
    };

    let mut lines = vec![
        "#".to_string(),
        "# Generated by romforge".to_string(),
        "#".to_string(),
        config_line("executable", &executable),
        config_line("args", &args),
        config_line("rompath", &rompath),
        config_line("romext", opts.rom_extensions),
        config_line("system", platform),
        config_line("info_source", "thegamesdb.net"),
    ];
    for (label, dirs) in art_directories(launchbox_dir, platform) {
        let joined = dirs
            .iter()
            .map(|d| d.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(";");
        lines.push(config_line(&format!("artwork {label}"), &joined));
    }

    // Attract-Mode expects Unix-style separators.
    Ok(lines.join("\n").replace('\\', "/") + "\n")
}

fn config_line(key: &str, value: &str) -> String {
    format!("{key:<20} {value}").trim_end().to_string()
}

/// Launch arguments: the platform assignment's command line plus the rom
/// placeholder, honoring the emulator's NoSpace / NoQuotes flags.
fn build_args(emulator: &Record, assignment: &Record) -> String {
    let mut args = assignment
        .get("CommandLine")
        .cloned()
        .unwrap_or_default();
    if emulator.get("NoSpace").map(String::as_str) != Some("true") {
        args.push(' ');
    }
    if emulator.get("NoQuotes").map(String::as_str) == Some("true") {
        args.push_str("[romfilename]");
    } else {
        args.push_str("\"[romfilename]\"");
    }
    args
}

/// Deduplicated `;`-joined list of directories holding the platform's roms.
/// LaunchBox stores a path per rom; Attract-Mode wants one list per
/// emulator.
fn rom_paths(launchbox_dir: &Path, platform: &str) -> Result<String> {
    let platform_xml = launchbox_dir
        .join("Data")
        .join("Platforms")
        .join(format!("{platform}.xml"));
    let Ok(xml) = std::fs::read_to_string(&platform_xml) else {
        warn!(path = %platform_xml.display(), "no platform catalog, rompath left empty");
        return Ok(String::new());
    };

    let mut dirs = BTreeSet::new();
    for game in super::read_games(&xml)? {
        if let Some(app_path) = game.get("ApplicationPath") {
            let dir = win_dir_name(app_path);
            if !dir.is_empty() {
                dirs.insert(absolutize(launchbox_dir, dir));
            }
        }
    }
    Ok(dirs.into_iter().collect::<Vec<_>>().join(";"))
}

/// Resolve a LaunchBox-relative path (possibly with Windows separators)
/// against the LaunchBox base directory. Absolute paths, including
/// drive-letter paths from a Windows install, pass through untouched.
fn absolutize(base: &Path, path: &str) -> String {
    let norm = path.replace('\\', "/");
    let has_drive = norm.len() >= 2 && norm.as_bytes()[1] == b':';
    if Path::new(&norm).is_absolute() || has_drive {
        norm
    } else {
        base.join(norm).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, &str)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn args_default_flags_space_and_quotes() {
        let emulator = record(&[("NoSpace", "false"), ("NoQuotes", "false")]);
        let assignment = record(&[("CommandLine", "-fullscreen")]);
        assert_eq!(
            build_args(&emulator, &assignment),
            "-fullscreen \"[romfilename]\""
        );
    }

    #[test]
    fn args_no_space_no_quotes() {
        let emulator = record(&[("NoSpace", "true"), ("NoQuotes", "true")]);
        let assignment = record(&[("CommandLine", "-rom=")]);
        assert_eq!(build_args(&emulator, &assignment), "-rom=[romfilename]");
    }

    #[test]
    fn args_with_empty_command_line() {
        let emulator = record(&[]);
        let assignment = record(&[]);
        assert_eq!(build_args(&emulator, &assignment), " \"[romfilename]\"");
    }

    #[test]
    fn absolutize_handles_windows_and_relative_paths() {
        let base = Path::new("/lb");
        assert_eq!(
            absolutize(base, r"Emulators\snes9x\snes9x.exe"),
            "/lb/Emulators/snes9x/snes9x.exe"
        );
        assert_eq!(absolutize(base, r"D:\emu\snes9x.exe"), "D:/emu/snes9x.exe");
        assert_eq!(absolutize(base, "/usr/bin/snes9x"), "/usr/bin/snes9x");
    }

    #[test]
    fn config_line_padding() {
        assert_eq!(config_line("system", "SNES"), "system               SNES");
        assert_eq!(config_line("rompath", ""), "rompath");
    }

    #[test]
    fn render_includes_artwork_stanza() {
        let dir = tempfile::tempdir().unwrap();
        let emulator = record(&[("ApplicationPath", r"Emulators\snes9x.exe")]);
        let assignment = record(&[("CommandLine", "-fullscreen")]);
        let opts = EmulatorOptions {
            rom_extensions: ".zip;.smc",
            rocketlauncher: None,
        };
        let cfg = render_config(
            dir.path(),
            Path::new("/am"),
            "SNES",
            &emulator,
            &assignment,
            &opts,
        )
        .unwrap();

        assert!(cfg.contains("executable"));
        assert!(cfg.contains("romext               .zip;.smc"));
        assert!(cfg.contains("artwork wheel"));
        assert!(cfg.contains("Images/SNES/Clear Logo"));
        assert!(!cfg.contains('\\'));
    }

    #[test]
    fn rocketlauncher_overrides_executable() {
        let dir = tempfile::tempdir().unwrap();
        let opts = EmulatorOptions {
            rom_extensions: ".zip",
            rocketlauncher: Some(Path::new("/rl/RocketLauncher.exe")),
        };
        let cfg = render_config(
            dir.path(),
            Path::new("/am"),
            "SNES",
            &record(&[]),
            &record(&[]),
            &opts,
        )
        .unwrap();

        assert!(cfg.contains("executable           /rl/RocketLauncher.exe"));
        assert!(cfg.contains("-s \"[emulator]\" -r \"[name]\" -p AttractMode"));
    }
}
