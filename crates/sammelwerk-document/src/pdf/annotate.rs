// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Annotations and overlays on existing pages: internal link annotations and
// extra content streams (running headers, page numbers, rules) drawn on top
// of whatever the page already shows.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use sammelwerk_core::error::{Result, SammelwerkError};

use crate::geometry::Rect;
use crate::text::metrics::encode_win_ansi;

/// Resource name of the overlay font. Unusual enough not to collide with the
/// names producers pick for their own fonts.
pub const OVERLAY_FONT: &str = "SwkHelv";

/// Where a dictionary-valued page entry lives.
enum Slot {
    Inline,
    Indirect(ObjectId),
    Missing,
}

/// Register the Helvetica (WinAnsi) font used by overlays. Call once per
/// document and pass the ID to [`stamp_overlay`].
pub fn add_overlay_font(document: &mut Document) -> ObjectId {
    document.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]))
}

/// Attach a borderless link on `page_id` covering `rect` that jumps to
/// `destination`, scrolled so that (`left`, `top`) is the top-left corner of
/// the view.
pub fn add_link(
    document: &mut Document,
    page_id: ObjectId,
    rect: Rect,
    destination: ObjectId,
    left: f32,
    top: f32,
) -> Result<()> {
    let annotation_id = document.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Annot".to_vec())),
        ("Subtype", Object::Name(b"Link".to_vec())),
        (
            "Rect",
            Object::Array(vec![
                Object::Real(rect.x),
                Object::Real(rect.y),
                Object::Real(rect.right()),
                Object::Real(rect.top()),
            ]),
        ),
        (
            "Border",
            Object::Array(vec![0.into(), 0.into(), 0.into()]),
        ),
        (
            "Dest",
            Object::Array(vec![
                Object::Reference(destination),
                Object::Name(b"XYZ".to_vec()),
                Object::Real(left),
                Object::Real(top),
                Object::Null,
            ]),
        ),
    ]));

    let slot = match page_dict(document, page_id)?.get(b"Annots") {
        Ok(Object::Array(_)) => Slot::Inline,
        Ok(Object::Reference(id)) => Slot::Indirect(*id),
        _ => Slot::Missing,
    };

    let annotation = Object::Reference(annotation_id);
    match slot {
        Slot::Inline => {
            if let Ok(Object::Array(annots)) = page_dict_mut(document, page_id)?.get_mut(b"Annots") {
                annots.push(annotation);
            }
        }
        Slot::Indirect(id) => match document.get_object_mut(id) {
            Ok(Object::Array(annots)) => annots.push(annotation),
            _ => page_dict_mut(document, page_id)?.set("Annots", Object::Array(vec![annotation])),
        },
        Slot::Missing => {
            page_dict_mut(document, page_id)?.set("Annots", Object::Array(vec![annotation]))
        }
    }

    Ok(())
}

/// Draw `operations` on top of the existing content of `page_id`.
///
/// The page's own content is wrapped in `q`/`Q` so any graphics state it
/// leaves behind does not leak into the overlay. `font_id` is made available
/// to the overlay as [`OVERLAY_FONT`].
pub fn stamp_overlay(
    document: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
    operations: Vec<Operation>,
) -> Result<()> {
    register_font(document, page_id, font_id)?;

    let existing: Vec<Object> = match page_dict(document, page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => match document.get_object(*id) {
            Ok(Object::Array(parts)) => parts.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(parts)) => parts.clone(),
        _ => Vec::new(),
    };

    let save_state = encode(vec![Operation::new("q", vec![])])?;
    let mut overlay = vec![Operation::new("Q", vec![])];
    overlay.extend(operations);
    let overlay = encode(overlay)?;

    let save_id = document.add_object(Stream::new(Dictionary::new(), save_state));
    let overlay_id = document.add_object(Stream::new(Dictionary::new(), overlay));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(overlay_id));

    page_dict_mut(document, page_id)?.set("Contents", Object::Array(contents));
    Ok(())
}

/// Operations drawing `text` with the overlay font, baseline starting at
/// (`x`, `y`), filled in grey.
pub fn text_operations(text: &str, x: f32, y: f32, size: f32) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("g", vec![Object::Real(0.25)]),
        Operation::new(
            "Tf",
            vec![Object::Name(OVERLAY_FONT.as_bytes().to_vec()), Object::Real(size)],
        ),
        Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
        Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}

/// Operations stroking a thin grey horizontal rule from `x1` to `x2` at `y`.
pub fn rule_operations(x1: f32, x2: f32, y: f32) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new("w", vec![Object::Real(0.5)]),
        Operation::new("G", vec![Object::Real(0.6)]),
        Operation::new("m", vec![Object::Real(x1), Object::Real(y)]),
        Operation::new("l", vec![Object::Real(x2), Object::Real(y)]),
        Operation::new("S", vec![]),
        Operation::new("Q", vec![]),
    ]
}

/// Make `font_id` reachable as /Font/SwkHelv from the page's resources.
fn register_font(document: &mut Document, page_id: ObjectId, font_id: ObjectId) -> Result<()> {
    let resources_slot = match page_dict(document, page_id)?.get(b"Resources") {
        Ok(Object::Dictionary(_)) => Slot::Inline,
        Ok(Object::Reference(id)) => Slot::Indirect(*id),
        _ => Slot::Missing,
    };

    let fonts_slot = match &resources_slot {
        Slot::Inline => font_slot(page_dict(document, page_id)?.get(b"Resources")),
        Slot::Indirect(id) => font_slot(document.get_object(*id)),
        Slot::Missing => Slot::Missing,
    };

    let font = Object::Reference(font_id);
    if let Slot::Indirect(fonts_id) = fonts_slot {
        let fonts = document
            .get_object_mut(fonts_id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| SammelwerkError::ExportFailed(format!("bad /Font resource: {}", err)))?;
        fonts.set(OVERLAY_FONT, font);
        return Ok(());
    }

    let resources = match resources_slot {
        Slot::Indirect(id) => document
            .get_object_mut(id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| SammelwerkError::ExportFailed(format!("bad /Resources: {}", err)))?,
        Slot::Inline | Slot::Missing => {
            let page = page_dict_mut(document, page_id)?;
            if !matches!(page.get(b"Resources"), Ok(Object::Dictionary(_))) {
                page.set("Resources", Object::Dictionary(Dictionary::new()));
            }
            page.get_mut(b"Resources")
                .and_then(Object::as_dict_mut)
                .map_err(|err| SammelwerkError::ExportFailed(format!("bad /Resources: {}", err)))?
        }
    };

    match resources.get_mut(b"Font") {
        Ok(Object::Dictionary(fonts)) => fonts.set(OVERLAY_FONT, font),
        _ => resources.set(
            "Font",
            Object::Dictionary(Dictionary::from_iter([(OVERLAY_FONT, font)])),
        ),
    }
    Ok(())
}

fn font_slot(resources: lopdf::Result<&Object>) -> Slot {
    match resources.and_then(Object::as_dict).map(|dict| dict.get(b"Font")) {
        Ok(Ok(Object::Dictionary(_))) => Slot::Inline,
        Ok(Ok(Object::Reference(id))) => Slot::Indirect(*id),
        _ => Slot::Missing,
    }
}

fn page_dict(document: &Document, page_id: ObjectId) -> Result<&Dictionary> {
    document
        .get_dictionary(page_id)
        .map_err(|err| SammelwerkError::ExportFailed(format!("cannot read page {:?}: {}", page_id, err)))
}

fn page_dict_mut(document: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary> {
    document
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|err| SammelwerkError::ExportFailed(format!("cannot edit page {:?}: {}", page_id, err)))
}

fn encode(operations: Vec<Operation>) -> Result<Vec<u8>> {
    Content { operations }
        .encode()
        .map_err(|err| SammelwerkError::ExportFailed(format!("cannot encode content: {}", err)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pdf::collection::PageCollection;
    use crate::pdf::collection::tests::sample_pdf;

    /// Every string shown by `Tj`/`TJ` on `page_id`, stream by stream.
    pub(crate) fn shown_text(document: &Document, page_id: ObjectId) -> Vec<String> {
        let mut shown = Vec::new();
        for stream_id in document.get_page_contents(page_id) {
            let stream = document.get_object(stream_id).unwrap().as_stream().unwrap();
            let data = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            for operation in Content::decode(&data).unwrap().operations {
                let operands: Vec<&Object> = match operation.operator.as_str() {
                    "Tj" | "'" => operation.operands.iter().take(1).collect(),
                    "TJ" => match operation.operands.first() {
                        Some(Object::Array(parts)) => parts.iter().collect(),
                        _ => Vec::new(),
                    },
                    _ => Vec::new(),
                };
                let text: String = operands
                    .into_iter()
                    .filter_map(|operand| match operand {
                        // Latin-1 view of the WinAnsi bytes.
                        Object::String(bytes, _) => {
                            Some(bytes.iter().map(|&b| b as char).collect::<String>())
                        }
                        _ => None,
                    })
                    .collect();
                if !text.is_empty() {
                    shown.push(text);
                }
            }
        }
        shown
    }

    fn merged(pages: usize) -> PageCollection {
        let mut collection = PageCollection::new();
        collection
            .append_all(&PageCollection::from_bytes(&sample_pdf(pages)).unwrap())
            .unwrap();
        collection
    }

    #[test]
    fn link_points_at_destination_page() {
        let mut collection = merged(2);
        let from = collection.page_id(0).unwrap();
        let to = collection.page_id(1).unwrap();

        add_link(
            collection.document_mut(),
            from,
            Rect::new(50.0, 700.0, 200.0, 14.0),
            to,
            0.0,
            842.0,
        )
        .unwrap();

        let document = collection.document();
        let annots = document
            .get_dictionary(from)
            .unwrap()
            .get(b"Annots")
            .unwrap()
            .as_array()
            .unwrap();
        assert_eq!(annots.len(), 1);

        let link = document
            .get_dictionary(annots[0].as_reference().unwrap())
            .unwrap();
        assert_eq!(link.get(b"Subtype").unwrap().as_name().unwrap(), b"Link");
        let dest = link.get(b"Dest").unwrap().as_array().unwrap();
        assert_eq!(dest[0].as_reference().unwrap(), to);
    }

    #[test]
    fn overlay_wraps_existing_content_and_registers_font() {
        let mut collection = merged(1);
        let page_id = collection.page_id(0).unwrap();
        let font_id = add_overlay_font(collection.document_mut());

        let mut ops = text_operations("Page 1 — of (1)", 500.0, 770.0, 9.0);
        ops.extend(rule_operations(50.0, 545.0, 760.0));
        stamp_overlay(collection.document_mut(), page_id, font_id, ops).unwrap();

        let document = collection.document();
        let page = document.get_dictionary(page_id).unwrap();
        let contents = page.get(b"Contents").unwrap().as_array().unwrap();
        assert_eq!(contents.len(), 3);

        let resources = match page.get(b"Resources").unwrap() {
            Object::Reference(id) => document.get_dictionary(*id).unwrap(),
            Object::Dictionary(dict) => dict,
            other => panic!("unexpected resources {other:?}"),
        };
        let fonts = match resources.get(b"Font").unwrap() {
            Object::Reference(id) => document.get_dictionary(*id).unwrap(),
            Object::Dictionary(dict) => dict,
            other => panic!("unexpected fonts {other:?}"),
        };
        assert!(fonts.has(OVERLAY_FONT.as_bytes()));
        // The page's own font is still there.
        assert!(fonts.has(b"F1"));

        let shown = shown_text(document, page_id);
        assert_eq!(shown.first().map(String::as_str), Some("Page 1"));
        assert_eq!(shown.last().map(String::as_str), Some("Page 1 \u{97} of (1)"));

        let bytes = collection.to_bytes().unwrap();
        assert_eq!(PageCollection::from_bytes(&bytes).unwrap().page_count(), 1);
    }
}
