// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page collection — an ordered set of PDF pages backed by `lopdf`. Used both
// to read PDF items and as the container every pipeline stage writes into.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Local};
use lopdf::{Dictionary, Document, Object, ObjectId};
use sammelwerk_core::error::{Result, SammelwerkError};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed page trees whose /Parent chain loops.
const MAX_TREE_DEPTH: usize = 64;

/// The visible area of a page in default user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// An ordered collection of PDF pages.
///
/// Wraps `lopdf::Document`. Pages can be copied in from other collections,
/// including their resources, annotations and inherited attributes.
pub struct PageCollection {
    document: Document,
}

impl PageCollection {
    // -- Construction ---------------------------------------------------------

    /// Create a collection with an empty page tree.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        document.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter([
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(Vec::new())),
                ("Count", Object::Integer(0)),
            ])),
        );
        let catalog_id = document.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        document.trailer.set("Root", Object::Reference(catalog_id));

        Self { document }
    }

    /// Open raw PDF bytes as a page collection.
    ///
    /// Anything `lopdf` cannot parse into a document with a page tree is
    /// reported as [`SammelwerkError::UnsupportedFile`].
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            SammelwerkError::UnsupportedFile(format!("not a readable PDF: {}", err))
        })?;

        let collection = Self { document };
        collection.pages_root()?;

        debug!(pages = collection.page_count(), "PDF loaded from bytes");
        Ok(collection)
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the collection.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Object IDs of every page, in page order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.document.get_pages().into_values().collect()
    }

    /// Object ID of the page at `index` (0-based).
    pub fn page_id(&self, index: usize) -> Option<ObjectId> {
        self.document.get_pages().into_values().nth(index)
    }

    /// Media box of the page at `index` (0-based), following inheritance.
    pub fn page_box(&self, index: usize) -> Result<PageBox> {
        let page_id = self.page_id(index).ok_or_else(|| {
            SammelwerkError::ExportFailed(format!(
                "page {} out of range (collection has {} pages)",
                index,
                self.page_count()
            ))
        })?;
        self.page_box_of(page_id)
    }

    /// Media box of the page object `page_id`, following inheritance.
    pub fn page_box_of(&self, page_id: ObjectId) -> Result<PageBox> {
        let page = self.document.get_dictionary(page_id).map_err(|err| {
            SammelwerkError::ExportFailed(format!("cannot read page {:?}: {}", page_id, err))
        })?;

        let media_box = inherited_attribute(&self.document, page, b"MediaBox")
            .and_then(|value| resolve(&self.document, value).as_array().ok())
            .and_then(|values| {
                let numbers: Vec<f32> = values
                    .iter()
                    .filter_map(|value| as_number(resolve(&self.document, value)))
                    .collect();
                (numbers.len() == 4).then(|| PageBox {
                    x: numbers[0].min(numbers[2]),
                    y: numbers[1].min(numbers[3]),
                    width: (numbers[2] - numbers[0]).abs(),
                    height: (numbers[3] - numbers[1]).abs(),
                })
            });

        // A page without a usable /MediaBox is rendered on US Letter by viewers.
        Ok(media_box.unwrap_or(PageBox {
            x: 0.0,
            y: 0.0,
            width: 612.0,
            height: 792.0,
        }))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    // -- Composition ----------------------------------------------------------

    /// Append every page of `source`, in order, to the end of this collection.
    ///
    /// Objects shared between source pages (fonts, images) are copied once, and
    /// references between pages (e.g. internal links) keep pointing at the
    /// copied pages.
    #[instrument(skip_all, fields(source_pages = source.page_count()))]
    pub fn append_all(&mut self, source: &PageCollection) -> Result<()> {
        let pages_id = self.pages_root()?;
        let source_pages = source.page_ids();

        let mut copier = PageCopier::new(&source.document, &mut self.document);
        let mut copied = Vec::with_capacity(source_pages.len());
        for page_id in source_pages {
            copied.push(copier.copy_page(page_id)?);
        }

        for page_id in &copied {
            if let Ok(Object::Dictionary(page)) = self.document.get_object_mut(*page_id) {
                page.set("Parent", Object::Reference(pages_id));
            }
        }

        let root = self
            .document
            .get_object_mut(pages_id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| SammelwerkError::ExportFailed(format!("no page tree root: {}", err)))?;

        let mut kids = match root.get(b"Kids") {
            Ok(Object::Array(kids)) => kids.clone(),
            _ => Vec::new(),
        };
        kids.extend(copied.iter().map(|id| Object::Reference(*id)));
        // /Count covers every leaf below the root, not just direct kids.
        let count = root.get(b"Count").and_then(Object::as_i64).unwrap_or(0) + copied.len() as i64;
        root.set("Kids", Object::Array(kids));
        root.set("Count", Object::Integer(count));

        debug!(appended = copied.len(), total = count, "Pages appended");
        Ok(())
    }

    /// Set `/Rotate 0` on every page so generated pages display upright
    /// regardless of any rotation their producer implied.
    pub fn normalize_rotation(&mut self) {
        for page_id in self.page_ids() {
            if let Ok(Object::Dictionary(page)) = self.document.get_object_mut(page_id) {
                page.set("Rotate", Object::Integer(0));
            }
        }
    }

    /// Write the document information dictionary and a fresh file identifier.
    pub fn set_metadata(&mut self, title: &str, created: DateTime<Local>) {
        let timestamp = created.format("D:%Y%m%d%H%M%S").to_string();
        let info_id = self.document.add_object(Dictionary::from_iter([
            ("Title", Object::string_literal(title)),
            ("Producer", Object::string_literal("Sammelwerk")),
            ("CreationDate", Object::string_literal(timestamp)),
        ]));
        self.document.trailer.set("Info", Object::Reference(info_id));

        let id = Uuid::new_v4().as_bytes().to_vec();
        self.document.trailer.set(
            "ID",
            Object::Array(vec![
                Object::String(id.clone(), lopdf::StringFormat::Hexadecimal),
                Object::String(id, lopdf::StringFormat::Hexadecimal),
            ]),
        );
    }

    // -- Output ---------------------------------------------------------------

    /// Serialise the collection to PDF bytes.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            SammelwerkError::ExportFailed(format!("failed to serialise PDF: {}", err))
        })?;
        Ok(output)
    }

    /// Serialise the collection and write it to `path`.
    ///
    /// The file is only created once serialisation has succeeded.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!(bytes = bytes.len(), "Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }

    // -- Helpers --------------------------------------------------------------

    /// Object ID of the root /Pages node.
    fn pages_root(&self) -> Result<ObjectId> {
        self.document
            .catalog()
            .map_err(|err| SammelwerkError::UnsupportedFile(format!("no catalog: {}", err)))
            .and_then(|catalog| {
                catalog
                    .get(b"Pages")
                    .map_err(|err| SammelwerkError::UnsupportedFile(format!("no /Pages: {}", err)))
                    .and_then(|pages_ref| match pages_ref {
                        Object::Reference(id) => Ok(*id),
                        _ => Err(SammelwerkError::UnsupportedFile(
                            "/Pages is not a reference".to_string(),
                        )),
                    })
            })
    }
}

impl Default for PageCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies pages and everything they reference from one document into another.
///
/// Every source object is copied at most once; the ID map also breaks the
/// reference cycles that annotations and link destinations create.
struct PageCopier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    mapped: HashMap<ObjectId, ObjectId>,
}

impl<'a> PageCopier<'a> {
    fn new(source: &'a Document, target: &'a mut Document) -> Self {
        Self {
            source,
            target,
            mapped: HashMap::new(),
        }
    }

    /// Copy one page, materialising any attributes it inherits from the
    /// source page tree. /Parent is left for the caller to set.
    fn copy_page(&mut self, page_id: ObjectId) -> Result<ObjectId> {
        let source = self.source;
        let page = source.get_dictionary(page_id).map_err(|err| {
            SammelwerkError::UnsupportedFile(format!("cannot read page object {:?}: {}", page_id, err))
        })?;

        let new_id = self.target_id(page_id);
        let mut copied = self.copy_dictionary(page);
        for key in INHERITABLE_KEYS {
            if copied.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(source, page, key) {
                let value = self.copy_object(value);
                copied.set(key.to_vec(), value);
            }
        }

        self.target.objects.insert(new_id, Object::Dictionary(copied));
        Ok(new_id)
    }

    fn target_id(&mut self, source_id: ObjectId) -> ObjectId {
        if let Some(id) = self.mapped.get(&source_id) {
            return *id;
        }
        let id = self.target.new_object_id();
        self.mapped.insert(source_id, id);
        id
    }

    fn copy_reference(&mut self, source_id: ObjectId) -> Object {
        if let Some(id) = self.mapped.get(&source_id) {
            return Object::Reference(*id);
        }

        let source = self.source;
        match source.get_object(source_id) {
            Ok(referenced) => {
                let new_id = self.target_id(source_id);
                let copied = self.copy_object(referenced);
                self.target.objects.insert(new_id, copied);
                Object::Reference(new_id)
            }
            Err(err) => {
                warn!(?source_id, %err, "Cannot resolve reference, using Null");
                Object::Null
            }
        }
    }

    fn copy_dictionary(&mut self, dict: &Dictionary) -> Dictionary {
        let mut copied = Dictionary::new();
        for (key, value) in dict.iter() {
            // The page tree is rebuilt by the caller.
            if key == b"Parent" {
                continue;
            }
            let value = self.copy_object(value);
            copied.set(key.clone(), value);
        }
        copied
    }

    fn copy_object(&mut self, object: &Object) -> Object {
        match object {
            Object::Reference(id) => self.copy_reference(*id),
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(dict)),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.copy_object(item)).collect())
            }
            Object::Stream(stream) => {
                let dict = self.copy_dictionary(&stream.dict);
                let mut copied = stream.clone();
                copied.dict = dict;
                Object::Stream(copied)
            }
            other => other.clone(),
        }
    }
}

/// Look up `key` on a page dictionary or, failing that, its ancestors.
fn inherited_attribute<'a>(
    document: &'a Document,
    page: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = document.get_dictionary(parent_id).ok()?;
    }
    None
}

/// Follow a reference to the object it points at; other objects pass through.
fn resolve<'a>(document: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => document.get_object(*id).unwrap_or(object),
        other => other,
    }
}

fn as_number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}
