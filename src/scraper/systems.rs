//! Systems-list and user-profile commands.
//!
//! The systems list is large and changes rarely, so it is cached as a
//! single fixed-name entry under the cache root. The user-profile command
//! is a lightweight credential check and is never cached.

use std::collections::BTreeMap;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::error::Result;
use crate::scraper::client::{CMD_SYSTEM_LIST, CMD_USER_INFO};
use crate::scraper::ScraperClient;

/// Fixed cache file name for the systems-list response.
pub const SYSTEMS_CACHE_FILE: &str = "screenscraper.fr-systemesListe.xml";

impl ScraperClient {
    /// Fetch the system list, returning a name → system-id map.
    ///
    /// Multiple names may map to the same id; when a system declares a
    /// company, a company-prefixed alias is added unless the company name
    /// is already part of the system name.
    pub async fn system_list(&self, force_refresh: bool) -> Result<BTreeMap<String, String>> {
        let cache_path = self.cache().systems_path();

        let body = if force_refresh {
            self.fetch_systems(&cache_path).await?
        } else {
            match self.cache().read(&cache_path)? {
                Some(body) => body,
                None => self.fetch_systems(&cache_path).await?,
            }
        };

        parse_system_list(&body)
    }

    async fn fetch_systems(&self, cache_path: &Path) -> Result<String> {
        let body = self.send(CMD_SYSTEM_LIST, &[]).await?;
        self.cache().write(cache_path, &body)?;
        Ok(body)
    }

    /// Fetch the authenticated user's profile fields.
    pub async fn user_info(&self) -> Result<BTreeMap<String, String>> {
        let body = self.send(CMD_USER_INFO, &[]).await?;
        parse_user_info(&body)
    }
}

/// Parse a `systemesListe` response into a name → id map.
fn parse_system_list(raw: &str) -> Result<BTreeMap<String, String>> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);

    let mut map = BTreeMap::new();
    let mut path: Vec<String> = Vec::new();
    let mut id = String::new();
    let mut company = String::new();
    let mut names: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                path.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Event::End(e) => {
                if e.name().as_ref() == b"systeme" {
                    flush_system(&mut map, &id, &company, &names);
                    id.clear();
                    company.clear();
                    names.clear();
                }
                path.pop();
            }
            Event::Text(text) => {
                let value = text.unescape()?.into_owned();
                if value.is_empty() || path.len() < 2 {
                    continue;
                }
                let tag = &path[path.len() - 1];
                let parent = &path[path.len() - 2];
                if parent == "systeme" && tag == "id" {
                    id = value;
                } else if parent == "systeme" && tag == "compagnie" {
                    company = value;
                } else if parent == "noms" {
                    names.push(value);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    debug!(systems = map.len(), "parsed system list");
    Ok(map)
}

fn flush_system(
    map: &mut BTreeMap<String, String>,
    id: &str,
    company: &str,
    names: &[String],
) {
    if id.is_empty() {
        return;
    }
    for name in names {
        map.insert(name.clone(), id.to_string());
        if !company.is_empty() && !name.contains(company) {
            map.insert(format!("{company} {name}"), id.to_string());
        }
    }
}

/// Parse a `ssuserInfos` response into a field → value map of the
/// `<ssuser>` children.
fn parse_user_info(raw: &str) -> Result<BTreeMap<String, String>> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);

    let mut map = BTreeMap::new();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                path.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Text(text) => {
                let value = text.unescape()?.into_owned();
                if value.is_empty() || path.len() < 2 {
                    continue;
                }
                if path[path.len() - 2] == "ssuser" {
                    map.insert(path[path.len() - 1].clone(), value);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSTEMS: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<Data>
  <systemes>
    <systeme>
      <id>4</id>
      <compagnie>Nintendo</compagnie>
      <noms>
        <nom_eu>Super Nintendo</nom_eu>
        <nom_us>Super NES</nom_us>
      </noms>
    </systeme>
    <systeme>
      <id>1</id>
      <compagnie>Sega</compagnie>
      <noms>
        <nom_eu>Sega Genesis</nom_eu>
      </noms>
    </systeme>
  </systemes>
</Data>"#;

    #[test]
    fn names_map_to_ids() {
        let map = parse_system_list(SYSTEMS).unwrap();
        assert_eq!(map["Super Nintendo"], "4");
        assert_eq!(map["Super NES"], "4");
        assert_eq!(map["Sega Genesis"], "1");
    }

    #[test]
    fn company_aliases_added_when_missing() {
        let map = parse_system_list(SYSTEMS).unwrap();
        assert_eq!(map["Nintendo Super Nintendo"], "4");
        // "Sega Genesis" already contains the company name.
        assert!(!map.contains_key("Sega Sega Genesis"));
    }

    #[test]
    fn user_info_fields() {
        let raw = r#"<?xml version="1.0" encoding="UTF-8" ?>
<Data>
  <ssuser>
    <id>player1</id>
    <niveau>5</niveau>
    <maxthreads>1</maxthreads>
  </ssuser>
</Data>"#;
        let map = parse_user_info(raw).unwrap();
        assert_eq!(map["id"], "player1");
        assert_eq!(map["niveau"], "5");
        assert_eq!(map["maxthreads"], "1");
    }
}
