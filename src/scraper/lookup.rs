//! Game lookup with a progressive retry ladder.
//!
//! A lookup first consults the on-disk cache, then walks up to three rungs
//! of identifying information, relaxing one step per malformed response:
//!
//! 1. full identity (checksum + declared name + size),
//! 2. name only, with release tags such as `(USA)` or `[v1.1]` stripped,
//! 3. the caller-supplied human-readable title, when there is one.
//!
//! Exhausting the ladder fails the lookup permanently and leaves an empty
//! `<rom>.crc` sidecar next to the source so a human can fill in a correct
//! checksum for the next run.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::identity::{self, Checksum, RomIdentity};
use crate::scraper::client::CMD_GAME_INFO;
use crate::scraper::ScraperClient;

// ---------------------------------------------------------------------------
// Retry ladder
// ---------------------------------------------------------------------------

/// One rung of the lookup retry ladder.
///
/// Transitions are a pure function of the current rung and whether a title
/// was supplied, so the retry policy is testable without a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rung {
    /// Checksum + declared name + declared size.
    FullIdentity,
    /// Declared name only, release tags stripped, no checksum.
    StrippedName,
    /// The caller-supplied human-readable title.
    Title,
}

impl Rung {
    /// The rung every lookup starts on.
    pub fn first() -> Self {
        Self::FullIdentity
    }

    /// Next rung after a malformed-envelope failure, or `None` when the
    /// ladder is exhausted. The title rung only exists when the caller
    /// supplied a title.
    pub fn next(self, has_title: bool) -> Option<Self> {
        match self {
            Self::FullIdentity => Some(Self::StrippedName),
            Self::StrippedName if has_title => Some(Self::Title),
            Self::StrippedName | Self::Title => None,
        }
    }
}

/// Strip bracketed and parenthetical release tags from a rom name, keeping
/// only the portion before the first marker: `"Super Mario World (U) [!]"`
/// becomes `"Super Mario World"`.
pub fn strip_release_tags(name: &str) -> String {
    name.replace('[', "(")
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// Lookup key
// ---------------------------------------------------------------------------

/// Identifying fields sent with one `jeuInfos` request. A fresh key is built
/// for each rung; a key is never mutated after its request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKey {
    /// CRC-32 checksum, present on the full-identity rung only.
    pub checksum: Option<String>,
    /// Declared rom name for this rung.
    pub rom_name: String,
    /// Declared size in bytes, when known.
    pub rom_size: Option<u64>,
    /// Service system id the lookup is scoped to.
    pub system_id: String,
    /// Optional rom type hint, passed through from the caller.
    pub rom_type: Option<String>,
}

impl LookupKey {
    /// Build the key for a given rung from the resolved identity and the
    /// caller-supplied request fields.
    ///
    /// Returns `None` for the title rung when no title was supplied.
    pub fn for_rung(rung: Rung, identity: &RomIdentity, req: &LookupRequest<'_>) -> Option<Self> {
        let (checksum, rom_name) = match rung {
            Rung::FullIdentity => (
                identity.checksum.known().map(str::to_string),
                identity.name.clone(),
            ),
            Rung::StrippedName => (None, strip_release_tags(&identity.name)),
            Rung::Title => (None, req.title?.to_string()),
        };

        Some(Self {
            checksum,
            rom_name,
            rom_size: Some(identity.size),
            system_id: req.system_id.to_string(),
            rom_type: req.rom_type.map(str::to_string),
        })
    }

    /// Render the key as `jeuInfos` query parameters.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(5);
        if let Some(crc) = &self.checksum {
            params.push(("crc", crc.clone()));
        }
        params.push(("systemeid", self.system_id.clone()));
        if let Some(rom_type) = &self.rom_type {
            params.push(("romtype", rom_type.clone()));
        }
        params.push(("romnom", self.rom_name.clone()));
        if let Some(size) = self.rom_size {
            params.push(("romtaille", size.to_string()));
        }
        params
    }
}

// ---------------------------------------------------------------------------
// Lookup request + execution
// ---------------------------------------------------------------------------

/// Caller-supplied inputs for one game lookup.
#[derive(Debug, Clone, Copy)]
pub struct LookupRequest<'a> {
    /// Service system id (e.g. `"4"` for the SNES).
    pub system_id: &'a str,
    /// Path of the rom file to identify.
    pub rom_path: &'a Path,
    /// Human-readable game title, used on the final rung.
    pub title: Option<&'a str>,
    /// Optional rom type hint for the service.
    pub rom_type: Option<&'a str>,
    /// Skip the cache and re-query the service.
    pub force_refresh: bool,
}

impl ScraperClient {
    /// Look up game metadata for a rom file, returning the raw XML response.
    ///
    /// The cache is consulted first unless `force_refresh` is set; a cache
    /// hit performs zero network requests. On a miss the retry ladder runs,
    /// and the first well-formed response is persisted to the cache before
    /// being returned.
    pub async fn lookup(&self, req: LookupRequest<'_>) -> Result<String> {
        let file_name = req
            .rom_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let cache_path = self.cache().game_path(req.system_id, &file_name);

        if !req.force_refresh {
            if let Some(body) = self.cache().read(&cache_path)? {
                return Ok(body);
            }
        }

        let identity = identity::resolve(req.rom_path)?;

        // An empty sidecar means a checksum is explicitly unknown: the
        // previous run already exhausted the ladder, so fail immediately
        // instead of retrying, unless the caller forces a refresh.
        if identity.checksum == Checksum::ExplicitUnknown && !req.force_refresh {
            info!(
                rom = %req.rom_path.display(),
                "checksum explicitly unknown, skipping lookup"
            );
            return Err(Error::RomNotFound {
                system_id: req.system_id.to_string(),
                rom_name: identity.name,
                response: None,
            });
        }

        let has_title = req.title.is_some();
        let mut rung = Some(Rung::first());
        let mut last_name = identity.name.clone();
        let mut last_response = None;

        while let Some(current) = rung {
            let key = match LookupKey::for_rung(current, &identity, &req) {
                Some(key) => key,
                None => break,
            };
            last_name = key.rom_name.clone();
            debug!(rung = ?current, name = %key.rom_name, "lookup attempt");

            match self.send(CMD_GAME_INFO, &key.query_params()).await {
                Ok(body) => {
                    self.cache().write(&cache_path, &body)?;
                    return Ok(body);
                }
                Err(Error::InvalidResponse { url, body }) => {
                    warn!(rung = ?current, url = %url, "malformed response envelope");
                    last_response = Some(body);
                    rung = current.next(has_title);
                }
                // Transport errors are not the ladder's business.
                Err(other) => return Err(other),
            }
        }

        write_empty_sidecar(req.rom_path);
        Err(Error::RomNotFound {
            system_id: req.system_id.to_string(),
            rom_name: last_name,
            response: last_response,
        })
    }
}

/// Leave an empty `<rom>.crc` sidecar so a human can fill in a checksum.
/// Its mere presence marks the checksum as explicitly unknown on the next
/// run. Failing to write it does not change the lookup outcome.
fn write_empty_sidecar(rom_path: &Path) {
    let sidecar: PathBuf = identity::sidecar_path(rom_path);
    match std::fs::write(&sidecar, "") {
        Ok(()) => info!(sidecar = %sidecar.display(), "created empty checksum sidecar"),
        Err(err) => warn!(sidecar = %sidecar.display(), error = %err, "failed to create sidecar"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> RomIdentity {
        RomIdentity {
            name: "Super Mario World (U) [!].zip".into(),
            checksum: Checksum::Known("DEADBEEF".into()),
            size: 524288,
        }
    }

    fn request(title: Option<&'static str>) -> LookupRequest<'static> {
        LookupRequest {
            system_id: "4",
            rom_path: Path::new("/roms/snes/Super Mario World (U) [!].zip"),
            title,
            rom_type: None,
            force_refresh: false,
        }
    }

    #[test]
    fn ladder_with_title_has_three_rungs() {
        let mut rungs = vec![Rung::first()];
        while let Some(next) = rungs.last().unwrap().next(true) {
            rungs.push(next);
        }
        assert_eq!(
            rungs,
            vec![Rung::FullIdentity, Rung::StrippedName, Rung::Title]
        );
    }

    #[test]
    fn ladder_without_title_has_two_rungs() {
        let mut rungs = vec![Rung::first()];
        while let Some(next) = rungs.last().unwrap().next(false) {
            rungs.push(next);
        }
        assert_eq!(rungs, vec![Rung::FullIdentity, Rung::StrippedName]);
    }

    #[test]
    fn strip_release_tags_cases() {
        assert_eq!(
            strip_release_tags("Super Mario World (U) [!].zip"),
            "Super Mario World"
        );
        assert_eq!(strip_release_tags("Ikaruga [v1.1] (Japan)"), "Ikaruga");
        assert_eq!(strip_release_tags("Plain Name"), "Plain Name");
    }

    #[test]
    fn full_identity_key_carries_everything() {
        let key = LookupKey::for_rung(Rung::FullIdentity, &identity(), &request(None)).unwrap();
        assert_eq!(key.checksum.as_deref(), Some("DEADBEEF"));
        assert_eq!(key.rom_name, "Super Mario World (U) [!].zip");
        assert_eq!(key.rom_size, Some(524288));
        assert_eq!(key.system_id, "4");
    }

    #[test]
    fn stripped_name_key_drops_checksum() {
        let key = LookupKey::for_rung(Rung::StrippedName, &identity(), &request(None)).unwrap();
        assert_eq!(key.checksum, None);
        assert_eq!(key.rom_name, "Super Mario World");
    }

    #[test]
    fn title_key_uses_supplied_title() {
        let key =
            LookupKey::for_rung(Rung::Title, &identity(), &request(Some("Super Mario World")))
                .unwrap();
        assert_eq!(key.checksum, None);
        assert_eq!(key.rom_name, "Super Mario World");
    }

    #[test]
    fn title_key_requires_a_title() {
        assert_eq!(LookupKey::for_rung(Rung::Title, &identity(), &request(None)), None);
    }

    #[test]
    fn explicit_unknown_omits_crc_param() {
        let id = RomIdentity {
            name: "game.nes".into(),
            checksum: Checksum::ExplicitUnknown,
            size: 32,
        };
        let key = LookupKey::for_rung(Rung::FullIdentity, &id, &request(None)).unwrap();
        assert_eq!(key.checksum, None);
        assert!(!key
            .query_params()
            .iter()
            .any(|(name, _)| *name == "crc"));
    }

    #[test]
    fn query_params_shape() {
        let key = LookupKey::for_rung(Rung::FullIdentity, &identity(), &request(None)).unwrap();
        let params = key.query_params();
        assert_eq!(params[0], ("crc", "DEADBEEF".to_string()));
        assert!(params.contains(&("systemeid", "4".to_string())));
        assert!(params.contains(&("romtaille", "524288".to_string())));
    }
}
