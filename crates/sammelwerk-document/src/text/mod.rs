// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text handling: word-processor decoding, Helvetica metrics and frame-based
// text flow.

pub mod decode;
pub mod flow;
pub mod metrics;

pub use decode::{DecodedFormat, DecodedText, decode_word_document};
pub use flow::{TextFrame, fill_frame, normalize_text, paginate};
