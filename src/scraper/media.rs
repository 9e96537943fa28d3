//! Media-asset map extraction from raw service responses.
//!
//! A game (or system) response carries a `<medias>` section whose child tag
//! names encode category, locale and value kind as underscore-separated
//! segments after a `media_` prefix, e.g. `media_wheel`, `media_wheel_us`
//! or `media_wheel_us_md5`. Leaves attach to the map directly; container
//! elements holding further tags recurse. The map is recomputed from the
//! raw XML each time, nothing here is persisted.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::error::Result;

/// Kind of value a media record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MediaKind {
    /// Download URL for the asset itself.
    Url,
    /// CRC-32 checksum of the asset.
    Crc,
    /// MD5 checksum of the asset.
    Md5,
    /// SHA-1 checksum of the asset.
    Sha1,
}

impl MediaKind {
    /// Parse a checksum kind segment (`crc`, `md5`, `sha1`).
    fn checksum_kind(segment: &str) -> Option<Self> {
        match segment {
            "crc" => Some(Self::Crc),
            "md5" => Some(Self::Md5),
            "sha1" => Some(Self::Sha1),
            _ => None,
        }
    }

    /// Parse any kind segment, including `url`.
    fn parse(segment: &str) -> Option<Self> {
        match segment {
            "url" => Some(Self::Url),
            other => Self::checksum_kind(other),
        }
    }

    /// Lowercase segment name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Crc => "crc",
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
        }
    }
}

/// Media assets grouped as category → locale → kind → value.
pub type MediaMap = BTreeMap<String, BTreeMap<String, BTreeMap<MediaKind, String>>>;

/// Extract the media-asset map from a raw response body.
///
/// Returns `Ok(None)` when the response has no `<medias>` section at all;
/// a present-but-empty section yields an empty map. Duplicate
/// (category, locale, kind) triples resolve last-write-wins.
pub fn extract_media(raw: &str) -> Result<Option<MediaMap>> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);

    let mut map = MediaMap::new();
    let mut seen_section = false;
    let mut medias_depth = 0usize;
    let mut stack: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "medias" {
                    seen_section = true;
                    medias_depth += 1;
                } else if medias_depth > 0 {
                    stack.push(name);
                }
            }
            Event::End(e) => {
                let name = e.name();
                if name.as_ref() == b"medias" {
                    medias_depth = medias_depth.saturating_sub(1);
                    stack.clear();
                } else if medias_depth > 0 {
                    stack.pop();
                }
            }
            Event::Text(text) if medias_depth > 0 => {
                let value = text.unescape()?.into_owned();
                if value.is_empty() {
                    continue;
                }
                if let Some(tag) = stack.last() {
                    if let Some((category, locale, kind)) = parse_media_tag(tag) {
                        debug!(category = %category, locale = %locale, kind = kind.as_str(), "media record");
                        map.entry(category)
                            .or_default()
                            .entry(locale)
                            .or_default()
                            .insert(kind, value);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if seen_section {
        Ok(Some(map))
    } else {
        Ok(None)
    }
}

/// Decompose a media tag name into (category, locale, kind).
///
/// Segment 0 after the `media_` prefix is the category. A lone second
/// segment is either a checksum kind (locale defaults to `all`) or a locale
/// (kind defaults to `url`); with three segments the order is locale then
/// kind. Tags with an unrecognized kind segment are dropped.
fn parse_media_tag(tag: &str) -> Option<(String, String, MediaKind)> {
    let rest = tag.strip_prefix("media_")?;
    let mut segments = rest.split('_');
    let category = segments.next().filter(|s| !s.is_empty())?;
    let second = segments.next();
    let third = segments.next();

    let (locale, kind) = match (second, third) {
        (None, _) => ("all".to_string(), MediaKind::Url),
        (Some(segment), None) => match MediaKind::checksum_kind(segment) {
            Some(kind) => ("all".to_string(), kind),
            None => (segment.to_string(), MediaKind::Url),
        },
        (Some(locale), Some(kind_segment)) => {
            (locale.to_string(), MediaKind::parse(kind_segment)?)
        }
    };

    Some((normalize_category(category), locale, kind))
}

/// Regroup the service's inconsistently named bezel categories: upstream
/// emits both `bezel...` and `bezel-...` tag spellings for the same
/// category (known upstream irregularity, best-effort heuristic).
fn normalize_category(name: &str) -> String {
    match name.strip_prefix("bezel-") {
        Some(rest) => format!("bezel{rest}"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHEEL_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<Data>
  <jeu>
    <medias>
      <media_wheel>http://example.test/wheel.png</media_wheel>
      <media_wheel_us>http://example.test/wheel-us.png</media_wheel_us>
      <media_wheel_us_md5>0123456789abcdef</media_wheel_us_md5>
    </medias>
  </jeu>
</Data>"#;

    #[test]
    fn wheel_grouping() {
        let map = extract_media(WHEEL_RESPONSE).unwrap().unwrap();
        let wheel = &map["wheel"];
        assert_eq!(wheel["all"][&MediaKind::Url], "http://example.test/wheel.png");
        assert_eq!(wheel["us"][&MediaKind::Url], "http://example.test/wheel-us.png");
        assert_eq!(wheel["us"][&MediaKind::Md5], "0123456789abcdef");
    }

    #[test]
    fn no_media_section_is_none() {
        let raw = r#"<?xml version="1.0" encoding="UTF-8" ?><Data><jeu><nom>X</nom></jeu></Data>"#;
        assert_eq!(extract_media(raw).unwrap(), None);
    }

    #[test]
    fn empty_media_section_is_empty_map() {
        let raw = r#"<?xml version="1.0" encoding="UTF-8" ?><Data><jeu><medias></medias></jeu></Data>"#;
        let map = extract_media(raw).unwrap().unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn nested_containers_recurse() {
        let raw = r#"<?xml version="1.0" encoding="UTF-8" ?>
<Data><systeme><medias>
  <media_logos>
    <media_logomonochrome_wor>http://example.test/logo.png</media_logomonochrome_wor>
    <media_logomonochrome_wor_crc>DEADBEEF</media_logomonochrome_wor_crc>
  </media_logos>
</medias></systeme></Data>"#;
        let map = extract_media(raw).unwrap().unwrap();
        let logo = &map["logomonochrome"];
        assert_eq!(logo["wor"][&MediaKind::Url], "http://example.test/logo.png");
        assert_eq!(logo["wor"][&MediaKind::Crc], "DEADBEEF");
    }

    #[test]
    fn bezel_prefix_normalized() {
        // Known upstream irregularity: hyphenated bezel category names.
        let raw = r#"<?xml version="1.0" encoding="UTF-8" ?>
<Data><jeu><medias>
  <media_bezel-16-9>http://example.test/bezel.png</media_bezel-16-9>
</medias></jeu></Data>"#;
        let map = extract_media(raw).unwrap().unwrap();
        assert!(map.contains_key("bezel16-9"));
        assert!(!map.contains_key("bezel-16-9"));
    }

    #[test]
    fn duplicate_triple_last_write_wins() {
        let raw = r#"<?xml version="1.0" encoding="UTF-8" ?>
<Data><jeu><medias>
  <media_wheel_us>first</media_wheel_us>
  <media_wheel_us>second</media_wheel_us>
</medias></jeu></Data>"#;
        let map = extract_media(raw).unwrap().unwrap();
        assert_eq!(map["wheel"]["us"][&MediaKind::Url], "second");
    }

    #[test]
    fn locale_vs_checksum_second_segment() {
        assert_eq!(
            parse_media_tag("media_wheel_md5"),
            Some(("wheel".into(), "all".into(), MediaKind::Md5))
        );
        assert_eq!(
            parse_media_tag("media_wheel_jp"),
            Some(("wheel".into(), "jp".into(), MediaKind::Url))
        );
        assert_eq!(parse_media_tag("media_wheel_jp_bogus"), None);
        assert_eq!(parse_media_tag("notmedia_wheel"), None);
    }
}
