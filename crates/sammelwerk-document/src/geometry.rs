// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectangles in PDF user space (origin bottom-left, y up, points).

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Largest rectangle with the aspect ratio `width:height` that fits inside
    /// `self`, centred. Degenerate sizes yield a zero-sized rectangle at the
    /// centre.
    pub fn fit_centered(&self, width: f32, height: f32) -> Rect {
        let (cx, cy) = (self.x + self.width / 2.0, self.y + self.height / 2.0);
        if width <= 0.0 || height <= 0.0 || self.width <= 0.0 || self.height <= 0.0 {
            return Rect::new(cx, cy, 0.0, 0.0);
        }

        let scale = (self.width / width).min(self.height / height);
        let (fitted_w, fitted_h) = (width * scale, height * scale);
        Rect::new(cx - fitted_w / 2.0, cy - fitted_h / 2.0, fitted_w, fitted_h)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.top()
            && other.y < self.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn wide_image_is_limited_by_width() {
        let area = Rect::new(50.0, 50.0, 512.0, 692.0);
        let fitted = area.fit_centered(2000.0, 1000.0);
        assert!(close(fitted.width, 512.0));
        assert!(close(fitted.height, 256.0));
        assert!(close(fitted.x, 50.0));
        assert!(close(fitted.y, 50.0 + (692.0 - 256.0) / 2.0));
    }

    #[test]
    fn small_image_is_scaled_up() {
        let area = Rect::new(0.0, 0.0, 100.0, 200.0);
        let fitted = area.fit_centered(10.0, 10.0);
        assert!(close(fitted.width, 100.0));
        assert!(close(fitted.height, 100.0));
        assert!(close(fitted.y, 50.0));
    }

    #[test]
    fn zero_sized_image_does_not_divide_by_zero() {
        let fitted = Rect::new(0.0, 0.0, 100.0, 100.0).fit_centered(0.0, 10.0);
        assert_eq!(fitted, Rect::new(50.0, 50.0, 0.0, 0.0));
    }

    #[test]
    fn intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
    }
}
