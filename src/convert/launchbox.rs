//! LaunchBox XML catalog reading.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;

/// A single record from a LaunchBox catalog: leaf tag name → text.
pub type Record = HashMap<String, String>;

/// Read every element named `record_tag` from a LaunchBox catalog into a
/// flat tag → text map per record. Nested structure below the record level
/// is not needed by any conversion, so only direct leaf children are kept.
pub fn read_records(xml: &str, record_tag: &str) -> Result<Vec<Record>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut current: Option<Record> = None;
    let mut leaf: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == record_tag {
                    current = Some(Record::new());
                } else if current.is_some() {
                    leaf = Some(name);
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == record_tag.as_bytes() {
                    if let Some(record) = current.take() {
                        records.push(record);
                    }
                }
                leaf = None;
            }
            Event::Text(text) => {
                if let (Some(record), Some(tag)) = (current.as_mut(), leaf.as_ref()) {
                    record.insert(tag.clone(), text.unescape()?.into_owned());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

/// Read the `<Game>` records from a platform catalog.
pub fn read_games(xml: &str) -> Result<Vec<Record>> {
    read_records(xml, "Game")
}

/// File stem of a path that may use either separator. LaunchBox catalogs
/// are written on Windows, so `\` has to be handled regardless of host.
pub fn win_file_stem(path: &str) -> &str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => name,
    }
}

/// Directory part of a path that may use either separator.
pub fn win_dir_name(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(idx) => &path[..idx],
        None => "",
    }
}
