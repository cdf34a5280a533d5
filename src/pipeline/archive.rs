//! Archive unpacking: ZIP response body → [`ConversionResult`].
//!
//! Entries are classified by file-name suffix and folded into the result in
//! archive order:
//!
//! | Suffix  | Becomes                         | Duplicates      |
//! |---------|---------------------------------|-----------------|
//! | `.png`  | an [`crate::ImagePayload`]      | all kept        |
//! | `.md`   | the Markdown text               | last one wins   |
//! | `.json` | the metadata document           | last one wins   |
//! | other   | ignored                         |                 |
//!
//! The layout service ships both `metadata.json` and a trailing
//! `layout.json`, so for that backend the layout document is what ends up
//! as metadata.

use crate::config::OutputMode;
use crate::error::ConvertError;
use crate::output::ConversionResult;
use crate::pipeline::encode;
use std::io::{Cursor, Read};
use tracing::{debug, info};
use zip::ZipArchive;

/// Largest uncompressed entry accepted from a response archive (256 MiB).
pub const MAX_ENTRY_BYTES: u64 = 256 * 1024 * 1024;

/// What an archive entry contributes to the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Image,
    Markdown,
    Metadata,
    Ignored,
}

impl EntryKind {
    /// Classify an entry by the suffix of its name.
    pub fn classify(name: &str) -> Self {
        if name.ends_with(".png") {
            EntryKind::Image
        } else if name.ends_with(".md") {
            EntryKind::Markdown
        } else if name.ends_with(".json") {
            EntryKind::Metadata
        } else {
            EntryKind::Ignored
        }
    }
}

/// Decode a markdown-mode response body.
pub fn unpack(body: &[u8]) -> Result<ConversionResult, ConvertError> {
    let mut archive = ZipArchive::new(Cursor::new(body))?;
    let mut result = ConversionResult {
        mode: OutputMode::Markdown,
        ..Default::default()
    };

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let kind = EntryKind::classify(&name);
        if kind == EntryKind::Ignored {
            debug!("Ignoring archive entry '{}'", name);
            continue;
        }

        let declared = entry.size();
        if declared > MAX_ENTRY_BYTES {
            return Err(oversized_entry(name, declared));
        }

        // The header may understate the size; never read past the limit.
        let mut contents = Vec::with_capacity(declared as usize);
        (&mut entry)
            .take(MAX_ENTRY_BYTES + 1)
            .read_to_end(&mut contents)
            .map_err(|e| ConvertError::InvalidEntry {
                name: name.clone(),
                detail: e.to_string(),
            })?;
        if contents.len() as u64 > MAX_ENTRY_BYTES {
            return Err(oversized_entry(name, contents.len() as u64));
        }

        match kind {
            EntryKind::Image => result.images.push(encode::encode_png(&name, contents)),
            EntryKind::Markdown => {
                let text = String::from_utf8(contents).map_err(|e| ConvertError::InvalidEntry {
                    name: name.clone(),
                    detail: format!("not UTF-8: {e}"),
                })?;
                if result.markdown.is_some() {
                    debug!("'{}' replaces an earlier Markdown entry", name);
                }
                result.markdown = Some(text);
            }
            EntryKind::Metadata => {
                let value: serde_json::Value =
                    serde_json::from_slice(&contents).map_err(|e| ConvertError::InvalidEntry {
                        name: name.clone(),
                        detail: e.to_string(),
                    })?;
                if result.metadata.is_some() {
                    debug!("'{}' replaces an earlier metadata entry", name);
                }
                result.metadata = Some(value);
            }
            EntryKind::Ignored => {}
        }
    }

    info!(
        "Unpacked archive: {} chars of Markdown, {} images, metadata: {}",
        result.markdown_text().len(),
        result.images.len(),
        result.metadata.is_some()
    );
    Ok(result)
}

fn oversized_entry(name: String, size: u64) -> ConvertError {
    ConvertError::InvalidEntry {
        name,
        detail: format!("{size} bytes exceeds the {MAX_ENTRY_BYTES} byte entry limit"),
    }
}

/// Decode a json-mode response body.
pub fn parse_json(body: &[u8]) -> Result<ConversionResult, ConvertError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ConvertError::InvalidJson(e.to_string()))?;
    Ok(ConversionResult::from_json(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, SimpleFileOptions::default()).unwrap();
            } else {
                zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                zip.write_all(data.as_bytes()).unwrap();
            }
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn classify_by_suffix() {
        assert_eq!(EntryKind::classify("page_1.png"), EntryKind::Image);
        assert_eq!(EntryKind::classify("converted.md"), EntryKind::Markdown);
        assert_eq!(EntryKind::classify("layout.json"), EntryKind::Metadata);
        assert_eq!(EntryKind::classify("notes.txt"), EntryKind::Ignored);
        assert_eq!(EntryKind::classify("image.PNG"), EntryKind::Ignored);
    }

    #[test]
    fn full_bundle() {
        let body = build_zip(&[
            ("doc.md", "# Doc\n"),
            ("page1.png", "png-1"),
            ("page2.png", "png-2"),
            ("meta.json", r#"{"pages": 2}"#),
        ]);
        let r = unpack(&body).unwrap();
        assert_eq!(r.mode, OutputMode::Markdown);
        assert_eq!(r.markdown.as_deref(), Some("# Doc\n"));
        assert_eq!(r.images.len(), 2);
        assert_eq!(r.images[0].name, "page1.png");
        assert_eq!(r.images[1].bytes, b"png-2");
        assert_eq!(r.metadata, Some(json!({"pages": 2})));
    }

    #[test]
    fn markdown_only_archive() {
        let body = build_zip(&[("converted.md", "hello")]);
        let r = unpack(&body).unwrap();
        assert_eq!(r.markdown.as_deref(), Some("hello"));
        assert!(r.images.is_empty());
        assert_eq!(r.metadata, None);
    }

    #[test]
    fn last_markdown_and_metadata_win() {
        let body = build_zip(&[
            ("converted.md", "first"),
            ("metadata.json", r#"{"source": "marker"}"#),
            ("extra/second.md", "second"),
            ("layout.json", r#"[{"page": 1}]"#),
        ]);
        let r = unpack(&body).unwrap();
        assert_eq!(r.markdown.as_deref(), Some("second"));
        assert_eq!(r.metadata, Some(json!([{"page": 1}])));
    }

    #[test]
    fn directories_and_other_entries_are_ignored() {
        let body = build_zip(&[
            ("assets/", ""),
            ("README.txt", "ignore me"),
            ("assets/page_1.png", "png"),
        ]);
        let r = unpack(&body).unwrap();
        assert_eq!(r.images.len(), 1);
        assert_eq!(r.markdown, None);
        assert_eq!(r.metadata, None);
    }

    #[test]
    fn garbage_body_is_invalid_archive() {
        let err = unpack(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidArchive(_)), "got: {err}");
        assert!(err.is_parse_error());
    }

    #[test]
    fn malformed_metadata_entry_is_parse_error() {
        let body = build_zip(&[("metadata.json", "{not json")]);
        let err = unpack(&body).unwrap_err();
        match err {
            ConvertError::InvalidEntry { name, .. } => assert_eq!(name, "metadata.json"),
            other => panic!("unexpected error: {other}"),
        }
    }

    /// A single stored entry whose headers declare `declared` uncompressed
    /// bytes while the archive only carries `data`.
    fn zip_with_declared_size(name: &str, data: &[u8], declared: u32) -> Vec<u8> {
        let name = name.as_bytes();
        let mut out = Vec::new();

        // Local file header.
        out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes()); // version needed
        out.extend_from_slice(&0u16.to_le_bytes()); // flags
        out.extend_from_slice(&0u16.to_le_bytes()); // stored
        out.extend_from_slice(&0u16.to_le_bytes()); // time
        out.extend_from_slice(&0x21u16.to_le_bytes()); // 1980-01-01
        out.extend_from_slice(&0u32.to_le_bytes()); // crc
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&declared.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // extra len
        out.extend_from_slice(name);
        out.extend_from_slice(data);

        // Central directory.
        let cd_offset = out.len() as u32;
        out.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes()); // version made by
        out.extend_from_slice(&20u16.to_le_bytes()); // version needed
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0x21u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&declared.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // extra len
        out.extend_from_slice(&0u16.to_le_bytes()); // comment len
        out.extend_from_slice(&0u16.to_le_bytes()); // disk start
        out.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
        out.extend_from_slice(&0u32.to_le_bytes()); // external attrs
        out.extend_from_slice(&0u32.to_le_bytes()); // local header offset
        out.extend_from_slice(name);
        let cd_size = out.len() as u32 - cd_offset;

        // End of central directory.
        out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&cd_size.to_le_bytes());
        out.extend_from_slice(&cd_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }

    #[test]
    fn oversized_declared_entry_is_rejected_before_reading() {
        let body = zip_with_declared_size("huge.md", b"hi", 0xF000_0000);
        let err = unpack(&body).unwrap_err();
        match err {
            ConvertError::InvalidEntry { name, detail } => {
                assert_eq!(name, "huge.md");
                assert!(detail.contains("entry limit"), "detail: {detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn json_body_becomes_metadata() {
        let r = parse_json(br#"{"marker_metadata": {}, "surya_layout": []}"#).unwrap();
        assert_eq!(r.mode, OutputMode::Json);
        assert!(r.markdown.is_none());
        assert!(r.images.is_empty());
        assert_eq!(r.metadata.unwrap()["surya_layout"], json!([]));
    }

    #[test]
    fn invalid_json_body() {
        let err = parse_json(b"<html>").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidJson(_)));
    }
}
