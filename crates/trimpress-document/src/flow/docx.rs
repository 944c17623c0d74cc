// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word (.docx) reader. Walks `word/document.xml` in document order, emitting
// paragraphs and embedded pictures as they appear.
//
// Pictures are referenced by relationship id (`a:blip r:embed` for DrawingML,
// `v:imagedata r:id` for legacy VML) and resolved through
// `word/_rels/document.xml.rels`.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use trimpress_core::error::{Result, TrimpressError};
use tracing::{debug, instrument};
use zip::ZipArchive;

use crate::detect::DOCX_MAIN_PART;
use crate::traits::FlowItem;

const DOCUMENT_RELS: &str = "word/_rels/document.xml.rels";

/// Read a DOCX into paragraphs and pictures, in document order.
///
/// Text that precedes a picture inside the same paragraph is emitted as its
/// own paragraph before the picture, so the interleaving matches the page.
#[instrument(skip_all, fields(bytes_len = bytes.len()))]
pub fn read_docx(bytes: &[u8]) -> Result<Vec<FlowItem>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|err| TrimpressError::UnsupportedSource(format!("not a ZIP archive: {err}")))?;

    let document_xml = read_archive_string(&mut archive, DOCX_MAIN_PART)?;
    let relationships = match read_archive_string(&mut archive, DOCUMENT_RELS) {
        Ok(xml) => parse_relationships(&xml)?,
        Err(err) => {
            debug!(%err, "No document relationships; pictures cannot be resolved");
            HashMap::new()
        }
    };

    let mut items = Vec::new();
    for block in parse_document(&document_xml)? {
        match block {
            Block::Text(text) => items.push(FlowItem::Paragraph(text)),
            Block::PictureRef(rel_id) => {
                let picture = match relationships.get(&rel_id) {
                    Some(Target::Part(target)) => {
                        read_archive_bytes(&mut archive, &resolve_target(target))?
                    }
                    Some(Target::External(url)) => {
                        return Err(TrimpressError::UnsupportedSource(format!(
                            "picture {rel_id} is linked to {url}, not embedded"
                        )));
                    }
                    None => {
                        return Err(TrimpressError::UnsupportedSource(format!(
                            "picture {rel_id} has no relationship"
                        )));
                    }
                };
                items.push(FlowItem::Picture(picture));
            }
        }
    }

    debug!(items = items.len(), "DOCX read");
    Ok(items)
}

/// Where a relationship points.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    /// A part inside the archive, relative to `word/`.
    Part(String),
    /// A URL outside the package (`TargetMode="External"`).
    External(String),
}

/// One block of `document.xml`, before pictures are loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Text(String),
    PictureRef(String),
}

fn parse_document(xml: &str) -> Result<Vec<Block>> {
    let mut reader = Reader::from_str(xml);
    let mut blocks = Vec::new();
    let mut paragraph = String::new();
    let mut in_paragraph = false;
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => {
                    // Nested paragraphs (text boxes) close out the outer text first.
                    flush_paragraph(&mut paragraph, &mut blocks, in_paragraph);
                    in_paragraph = true;
                }
                b"t" => in_text_run = true,
                b"blip" | b"imagedata" => {
                    if let Some(rel_id) = picture_rel_id(&e) {
                        flush_paragraph(&mut paragraph, &mut blocks, in_paragraph);
                        blocks.push(Block::PictureRef(rel_id));
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"p" => blocks.push(Block::Text(String::new())),
                b"tab" if in_paragraph => paragraph.push('\t'),
                b"br" | b"cr" if in_paragraph => paragraph.push('\n'),
                b"blip" | b"imagedata" => {
                    if let Some(rel_id) = picture_rel_id(&e) {
                        flush_paragraph(&mut paragraph, &mut blocks, in_paragraph);
                        blocks.push(Block::PictureRef(rel_id));
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_run {
                    paragraph.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_text_run {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        paragraph.push(resolved);
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => {
                    blocks.push(Block::Text(std::mem::take(&mut paragraph)));
                    in_paragraph = false;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(TrimpressError::UnsupportedSource(format!(
                    "malformed document.xml at byte {}: {err}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    Ok(blocks)
}

fn flush_paragraph(paragraph: &mut String, blocks: &mut Vec<Block>, in_paragraph: bool) {
    if in_paragraph && !paragraph.trim().is_empty() {
        blocks.push(Block::Text(std::mem::take(paragraph)));
    } else {
        paragraph.clear();
    }
}

fn picture_rel_id(e: &BytesStart<'_>) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        let local = attr.key.local_name();
        let is_ref = matches!(local.as_ref(), b"embed" | b"id")
            && attr.key.prefix().is_some_and(|p| p.as_ref() == b"r");
        is_ref.then(|| String::from_utf8_lossy(&attr.value).into_owned())
    })
}

fn parse_relationships(xml: &str) -> Result<HashMap<String, Target>> {
    let mut reader = Reader::from_str(xml);
    let mut rels = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                let mut external = false;
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).into_owned();
                    match attr.key.as_ref() {
                        b"Id" => id = Some(value),
                        b"Target" => target = Some(value),
                        b"TargetMode" => external = value == "External",
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    let target = if external {
                        Target::External(target)
                    } else {
                        Target::Part(target)
                    };
                    rels.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(TrimpressError::UnsupportedSource(format!(
                    "malformed relationships part: {err}"
                )));
            }
            _ => {}
        }
    }

    Ok(rels)
}

/// Relationship targets are relative to `word/` unless absolute.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => {
            let mut parts: Vec<&str> = vec!["word"];
            for segment in target.split('/') {
                match segment {
                    "" | "." => {}
                    ".." => {
                        parts.pop();
                    }
                    other => parts.push(other),
                }
            }
            parts.join("/")
        }
    }
}

fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

fn read_archive_bytes<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Vec<u8>> {
    let mut file = archive.by_name(path).map_err(|err| {
        TrimpressError::UnsupportedSource(format!("missing DOCX part {path}: {err}"))
    })?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

fn read_archive_string<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let bytes = read_archive_bytes(archive, path)?;
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF][..]).unwrap_or(&bytes);
    String::from_utf8(bytes.to_vec())
        .map_err(|err| TrimpressError::UnsupportedSource(format!("{path} is not UTF-8: {err}")))
}
