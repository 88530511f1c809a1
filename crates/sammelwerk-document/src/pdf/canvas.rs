// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page canvas — draws new pages (flowed text, placed images, TOC lines) with
// `printpdf` 0.8 and hands them back as a `PageCollection`.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
    XObjectTransform,
};
use sammelwerk_core::PageGeometry;
use sammelwerk_core::error::{Result, SammelwerkError};
use tracing::{debug, instrument, warn};

use crate::geometry::Rect;
use crate::image::DecodedImage;
use crate::pdf::collection::PageCollection;

/// Images are embedded at 72 DPI so one pixel starts out as one point and the
/// transform scale maps pixels straight onto the target rectangle.
const IMAGE_DPI: f32 = 72.0;

/// One line of text positioned on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    /// Left edge of the text.
    pub x: f32,
    pub baseline: f32,
    pub size: f32,
    pub bold: bool,
}

impl TextLine {
    pub fn regular(text: impl Into<String>, x: f32, baseline: f32, size: f32) -> Self {
        Self {
            text: text.into(),
            x,
            baseline,
            size,
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>, x: f32, baseline: f32, size: f32) -> Self {
        Self {
            bold: true,
            ..Self::regular(text, x, baseline, size)
        }
    }
}

/// Accumulates generated pages of one fixed geometry.
pub struct PageCanvas {
    geometry: PageGeometry,
    document: PdfDocument,
    pages: Vec<PdfPage>,
}

impl PageCanvas {
    /// Start an empty canvas; `title` goes into the intermediate document's
    /// metadata only.
    pub fn new(geometry: PageGeometry, title: &str) -> Self {
        Self {
            geometry,
            document: PdfDocument::new(title),
            pages: Vec::new(),
        }
    }

    /// Number of pages drawn so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Add a page showing `lines` in Helvetica.
    pub fn add_text_page(&mut self, lines: &[TextLine]) {
        let mut ops: Vec<Op> = Vec::with_capacity(lines.len() * 5);
        for line in lines.iter().filter(|line| !line.text.is_empty()) {
            let font = if line.bold {
                BuiltinFont::HelveticaBold
            } else {
                BuiltinFont::Helvetica
            };
            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(line.x),
                    y: Pt(line.baseline),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(line.size),
                font,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(line.text.clone())],
                font,
            });
            ops.push(Op::EndTextSection);
        }

        self.push_page(ops);
    }

    /// Add a page with `image` drawn into `target`.
    pub fn add_image_page(&mut self, image: &DecodedImage, target: Rect) {
        let xobject_id = self.document.add_image(&image.to_raw_image());

        let scale_x = target.width / image.width() as f32;
        let scale_y = target.height / image.height() as f32;

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(target.x)),
                translate_y: Some(Pt(target.y)),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                dpi: Some(IMAGE_DPI),
                rotate: None,
            },
        }];

        debug!(
            x = target.x,
            y = target.y,
            width = target.width,
            height = target.height,
            "Image placed on page"
        );
        self.push_page(ops);
    }

    /// Serialise the drawn pages and reopen them as a page collection with
    /// every page explicitly upright.
    #[instrument(skip(self), fields(pages = self.pages.len()))]
    pub fn finish(self) -> Result<PageCollection> {
        let Self {
            mut document,
            pages,
            ..
        } = self;

        let expected = pages.len();
        if expected == 0 {
            return Ok(PageCollection::new());
        }

        document.with_pages(pages);
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = document.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(count = warnings.len(), "printpdf reported warnings");
        }

        let mut collection = PageCollection::from_bytes(&bytes).map_err(|err| {
            SammelwerkError::ExportFailed(format!("generated pages could not be reopened: {}", err))
        })?;
        if collection.page_count() != expected {
            warn!(
                expected,
                actual = collection.page_count(),
                "Generated page count mismatch"
            );
            return Err(SammelwerkError::ExportFailed(format!(
                "expected {} generated pages, found {}",
                expected,
                collection.page_count()
            )));
        }

        collection.normalize_rotation();
        Ok(collection)
    }

    fn push_page(&mut self, ops: Vec<Op>) {
        self.pages.push(PdfPage::new(
            pt_to_mm(self.geometry.width),
            pt_to_mm(self.geometry.height),
            ops,
        ));
    }
}

fn pt_to_mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}
