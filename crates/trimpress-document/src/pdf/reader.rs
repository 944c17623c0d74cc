// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open an existing PDF with `lopdf` and split it into standalone
// single-page documents that a rasteriser can render one at a time.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use trimpress_core::error::TrimpressError;
use tracing::{debug, info, instrument, warn};

use crate::traits::{PageSource, RenderablePage};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// US Letter, used when a page declares no MediaBox anywhere in its tree.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Reads existing PDF files and splits them into pages.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Create a reader from raw PDF bytes already in memory.
    ///
    /// A document lopdf cannot parse is an `UnsupportedSource`: the bytes
    /// claimed to be a PDF but are damaged or truncated.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, TrimpressError> {
        let document = Document::load_mem(data).map_err(|err| {
            TrimpressError::UnsupportedSource(format!("unreadable PDF: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Visible size of a page (1-indexed) in points, honouring /Rotate.
    pub fn page_size_pt(&self, page_number: u32) -> Result<(f64, f64), TrimpressError> {
        let page_id = self.page_id(page_number)?;
        let media_box = self
            .inherited(page_id, b"MediaBox")
            .and_then(|obj| rect_from_object(&self.document, obj))
            .unwrap_or(DEFAULT_MEDIA_BOX);

        let width = (media_box[2] - media_box[0]).abs() as f64;
        let height = (media_box[3] - media_box[1]).abs() as f64;

        let rotation = self
            .inherited(page_id, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0)
            .rem_euclid(360);

        Ok(if rotation == 90 || rotation == 270 {
            (height, width)
        } else {
            (width, height)
        })
    }

    // -- Extraction -----------------------------------------------------------

    /// Extract a single page (1-indexed) into a new standalone PDF document.
    ///
    /// Returns the serialised bytes of the single-page PDF.
    #[instrument(skip(self))]
    pub fn extract_page(&self, page_number: u32) -> Result<Vec<u8>, TrimpressError> {
        let page_id = self.page_id(page_number)?;

        let mut new_doc = empty_document();
        let mut cloned = BTreeMap::new();
        let new_page_id = clone_page_into(&self.document, &mut new_doc, page_id, &mut cloned)?;

        // Parent links are skipped during cloning, so inherited attributes
        // must be copied onto the page itself.
        for key in INHERITABLE_KEYS {
            if let Some(value) = self.inherited(page_id, key) {
                let value = deep_clone_object(&self.document, &mut new_doc, value, &mut cloned);
                if let Ok(Object::Dictionary(dict)) = new_doc.get_object_mut(new_page_id) {
                    if !dict.has(key) {
                        dict.set(key.to_vec(), value);
                    }
                }
            }
        }

        let mut output = Vec::new();
        new_doc.save_to(&mut output).map_err(|err| {
            TrimpressError::PdfError(format!("failed to serialise extracted page: {}", err))
        })?;

        debug!(page_number, output_bytes = output.len(), "Page extracted");
        Ok(output)
    }

    /// Split every page into a [`RenderablePage`], in page order.
    #[instrument(skip(self), fields(pages = self.page_count()))]
    pub fn split_pages(&self) -> Result<Vec<RenderablePage>, TrimpressError> {
        let total = self.page_count() as u32;
        info!(total, "Splitting PDF into pages");

        (1..=total)
            .map(|page_number| {
                let (width_pt, height_pt) = self.page_size_pt(page_number)?;
                Ok(RenderablePage {
                    index: (page_number - 1) as usize,
                    width_pt,
                    height_pt,
                    source: PageSource::Pdf(self.extract_page(page_number)?),
                })
            })
            .collect()
    }

    // -- Helpers --------------------------------------------------------------

    fn page_id(&self, page_number: u32) -> Result<ObjectId, TrimpressError> {
        let pages = self.document.get_pages();
        pages.get(&page_number).copied().ok_or_else(|| {
            TrimpressError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                pages.len()
            ))
        })
    }

    /// Look up `key` on a page or, failing that, on its page-tree ancestors.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = Some(page_id);
        // Guard against malformed trees whose /Parent chain loops.
        let mut depth = 0;
        while let Some(id) = current {
            if depth > 64 {
                warn!(?page_id, "Page tree too deep; giving up on inheritance");
                return None;
            }
            let dict = self.document.get_dictionary(id).ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
            depth += 1;
        }
        None
    }
}

/// A document with an empty page tree and catalog, ready for pages.
fn empty_document() -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn rect_from_object(doc: &Document, object: &Object) -> Option<[f32; 4]> {
    let object = match object {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let values = object.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let mut rect = [0.0f32; 4];
    for (slot, value) in rect.iter_mut().zip(values) {
        *slot = value.as_float().ok()?;
    }
    Some(rect)
}

/// Clone a single page object (and its referenced resources) from `source` into
/// `target`, appending it as the last page. Returns the page's id in `target`.
fn clone_page_into(
    source: &Document,
    target: &mut Document,
    page_id: ObjectId,
    cloned: &mut BTreeMap<ObjectId, ObjectId>,
) -> Result<ObjectId, TrimpressError> {
    let page_object = source.get_object(page_id).map_err(|err| {
        TrimpressError::PdfError(format!("cannot read page object {:?}: {}", page_id, err))
    })?;

    let new_id = target.new_object_id();
    cloned.insert(page_id, new_id);
    let page_copy = deep_clone_object(source, target, page_object, cloned);
    target.objects.insert(new_id, page_copy);

    let pages_id = target
        .catalog()
        .map_err(|err| TrimpressError::PdfError(format!("no catalog: {}", err)))
        .and_then(|catalog| {
            catalog
                .get(b"Pages")
                .and_then(Object::as_reference)
                .map_err(|err| TrimpressError::PdfError(format!("no /Pages: {}", err)))
        })?;

    if let Ok(Object::Dictionary(pages_dict)) = target.get_object_mut(pages_id) {
        if let Ok(Object::Array(kids)) = pages_dict.get_mut(b"Kids") {
            kids.push(Object::Reference(new_id));
        }
        if let Ok(Object::Integer(count)) = pages_dict.get_mut(b"Count") {
            *count += 1;
        }
    }

    if let Ok(Object::Dictionary(page_dict)) = target.get_object_mut(new_id) {
        page_dict.set("Parent", Object::Reference(pages_id));
    }

    Ok(new_id)
}

/// Deep-clone a lopdf Object, copying every referenced object exactly once.
///
/// `cloned` maps source ids to target ids; an id is recorded before its
/// contents are copied so reference cycles terminate. /Parent is skipped and
/// patched by the caller; /Annots is dropped.
fn deep_clone_object(
    source: &Document,
    target: &mut Document,
    object: &Object,
    cloned: &mut BTreeMap<ObjectId, ObjectId>,
) -> Object {
    match object {
        Object::Dictionary(dict) => {
            Object::Dictionary(clone_dictionary(source, target, dict, cloned))
        }
        Object::Array(arr) => Object::Array(
            arr.iter()
                .map(|item| deep_clone_object(source, target, item, cloned))
                .collect(),
        ),
        Object::Reference(ref_id) => {
            if let Some(existing) = cloned.get(ref_id) {
                return Object::Reference(*existing);
            }
            match source.get_object(*ref_id) {
                Ok(referenced) => {
                    let new_id = target.new_object_id();
                    cloned.insert(*ref_id, new_id);
                    let copy = deep_clone_object(source, target, referenced, cloned);
                    target.objects.insert(new_id, copy);
                    Object::Reference(new_id)
                }
                Err(err) => {
                    warn!(?ref_id, %err, "Cannot resolve reference, using Null");
                    Object::Null
                }
            }
        }
        Object::Stream(stream) => Object::Stream(lopdf::Stream::new(
            clone_dictionary(source, target, &stream.dict, cloned),
            stream.content.clone(),
        )),
        // Boolean, Integer, Real, String, Name, Null.
        other => other.clone(),
    }
}

fn clone_dictionary(
    source: &Document,
    target: &mut Document,
    dict: &Dictionary,
    cloned: &mut BTreeMap<ObjectId, ObjectId>,
) -> Dictionary {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        // Annotations can point at other pages and drag the whole document in.
        if key == b"Parent" || key == b"Annots" {
            continue;
        }
        new_dict.set(key.clone(), deep_clone_object(source, target, value, cloned));
    }
    new_dict
}
