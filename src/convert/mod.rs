//! LaunchBox catalog to Attract-Mode flat-file conversion.
//!
//! LaunchBox keeps one XML catalog per platform under `Data/Platforms/` and
//! a shared `Data/Emulators.xml`; Attract-Mode wants `;`-delimited romlist
//! text files and per-platform emulator `.cfg` files. Both conversions are
//! deterministic field mappings, run as batch jobs that never touch the
//! scraper.

pub mod emulator;
pub mod romlist;

mod launchbox;

pub use launchbox::{read_games, read_records, win_dir_name, win_file_stem, Record};

use std::path::{Path, PathBuf};

/// Artwork directory layout shared by the emulator generator and the
/// artwork maintenance jobs: Attract-Mode artwork label → LaunchBox image
/// directory names searched in priority order.
pub const ART_DIRS: &[(&str, &[&str])] = &[
    (
        "flyer",
        &[
            "Box - Front",
            "Advertisement Flyer - Front",
            "Box - 3D",
            "Arcade - Cabinet",
        ],
    ),
    ("marquee", &["Banner", "Arcade - Marquee"]),
    (
        "snap",
        &[
            "Screenshot - Gameplay",
            "Screenshot - Game Title",
            "Screenshot - Game Select",
        ],
    ),
    ("wheel", &["Clear Logo"]),
    ("fanart", &["Fanart - Background"]),
];

/// Region subdirectories LaunchBox may nest images under.
pub const ART_REGIONS: &[&str] = &["United States", "North America", "Europe", "Japan"];

/// Expand [`ART_DIRS`] for one platform into concrete directories: each
/// image directory followed by its region subdirectories. The `snap` label
/// additionally covers the platform's `Videos` directory.
pub fn art_directories(launchbox_dir: &Path, platform: &str) -> Vec<(&'static str, Vec<PathBuf>)> {
    ART_DIRS
        .iter()
        .map(|(label, names)| {
            let mut bases: Vec<PathBuf> = names
                .iter()
                .map(|name| launchbox_dir.join("Images").join(platform).join(name))
                .collect();
            if *label == "snap" {
                bases.push(launchbox_dir.join("Videos").join(platform));
            }

            let mut dirs = Vec::new();
            for base in bases {
                let regions: Vec<PathBuf> =
                    ART_REGIONS.iter().map(|region| base.join(region)).collect();
                dirs.push(base);
                dirs.extend(regions);
            }
            (*label, dirs)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn art_directories_order_and_regions() {
        let dirs = art_directories(Path::new("/lb"), "SNES");
        let (label, wheel) = dirs.iter().find(|(l, _)| *l == "wheel").unwrap();
        assert_eq!(*label, "wheel");
        assert_eq!(wheel[0], PathBuf::from("/lb/Images/SNES/Clear Logo"));
        assert_eq!(
            wheel[1],
            PathBuf::from("/lb/Images/SNES/Clear Logo/United States")
        );
        assert_eq!(wheel.len(), 1 + ART_REGIONS.len());
    }

    #[test]
    fn snap_includes_videos_directory() {
        let dirs = art_directories(Path::new("/lb"), "SNES");
        let (_, snap) = dirs.iter().find(|(l, _)| *l == "snap").unwrap();
        assert!(snap.contains(&PathBuf::from("/lb/Videos/SNES")));
    }
}
