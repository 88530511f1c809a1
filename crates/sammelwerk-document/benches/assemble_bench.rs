// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the sammelwerk-document crate. Measures a full
// assembly run over a synthetic mix of PDF, image and text items.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};

use sammelwerk_core::types::{ContentKind, Item};
use sammelwerk_document::Assembler;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A PDF with `pages` single-line pages.
fn synthetic_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));

    let mut kids = Vec::new();
    for number in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page {}", number))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
            (
                "Resources",
                Object::Dictionary(Dictionary::from_iter([(
                    "Font",
                    Object::Dictionary(Dictionary::from_iter([("F1", Object::Reference(font_id))])),
                )])),
            ),
            (
                "MediaBox",
                Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            ),
        ]));
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(pages as i64)),
            ("Kids", Object::Array(kids)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save synthetic pdf");
    bytes
}

fn synthetic_png() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([40, 90, 160])));
    let mut buffer = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("encode png");
    buffer
}

fn synthetic_items() -> Vec<Item> {
    let pdf = synthetic_pdf(3);
    let png = synthetic_png();
    let text = "The quick brown fox jumps over the lazy dog. ".repeat(400);

    (0..12)
        .map(|n| match n % 3 {
            0 => Item::from_bytes(pdf.clone(), ContentKind::Pdf, format!("Report {n}")),
            1 => Item::from_bytes(png.clone(), ContentKind::Image, format!("Figure {n}")),
            _ => Item::from_bytes(text.clone().into_bytes(), ContentKind::Text, format!("Notes {n}"))
                .with_description("flowed text"),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Full pipeline: sections, TOC sizing and layout, finishing, serialisation.
fn bench_assemble(c: &mut Criterion) {
    let items = synthetic_items();
    let assembler = Assembler::new();

    c.bench_function("assemble (12 mixed items)", |b| {
        b.iter(|| {
            let mut document = assembler.assemble(black_box(&items)).expect("assemble");
            black_box(document.to_bytes().expect("serialise"));
        });
    });
}

criterion_group!(benches, bench_assemble);
criterion_main!(benches);
