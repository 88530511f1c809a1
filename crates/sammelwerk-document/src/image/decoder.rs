// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image decoder — turns encoded image bytes into pixels with known dimensions
// using the `image` crate.

use image::DynamicImage;
use printpdf::{RawImage, RawImageData, RawImageFormat};
use sammelwerk_core::error::{Result, SammelwerkError};
use tracing::{debug, instrument};

/// A decoded raster image.
pub struct DecodedImage {
    image: DynamicImage,
}

impl DecodedImage {
    /// Decode raw encoded bytes (PNG, JPEG, GIF, ...).
    ///
    /// Fails with [`SammelwerkError::InvalidImage`] when the format is not
    /// recognised, the data is corrupt, or the image has no pixels.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data).map_err(|err| {
            SammelwerkError::InvalidImage(format!("failed to decode image: {}", err))
        })?;
        if image.width() == 0 || image.height() == 0 {
            return Err(SammelwerkError::InvalidImage("image has no pixels".into()));
        }

        debug!(
            width = image.width(),
            height = image.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel data in the form `printpdf` embeds as an image XObject.
    ///
    /// Alpha is dropped; transparent regions render over white paper anyway.
    pub fn to_raw_image(&self) -> RawImage {
        let rgb = self.image.to_rgb8();
        RawImage {
            pixels: RawImageData::U8(rgb.into_raw()),
            width: self.width() as usize,
            height: self.height() as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        }
    }
}
