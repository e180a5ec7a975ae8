// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Fog mask data structures.
//!
//! A `FogMask` holds one opacity byte per floor pixel (0 = revealed,
//! 255 = fogged) together with the set of brush centres the user has
//! revealed. The explored set is what gets saved; the buffer is the live
//! picture and is only rebuilt from the set when a floor is loaded.
//!
//! Strokes of opposite polarity can make the two disagree: the buffer keeps
//! the saturated result of every stroke, while the set only remembers the
//! last operation at each centre.

use image::{Rgba, RgbaImage};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Brush polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushOp {
    Reveal,
    Cover,
}

impl BrushOp {
    /// The opposite polarity.
    pub fn inverse(self) -> Self {
        match self {
            BrushOp::Reveal => BrushOp::Cover,
            BrushOp::Cover => BrushOp::Reveal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BrushOp::Reveal => "Reveal",
            BrushOp::Cover => "Fog",
        }
    }
}

/// Alpha plane of a tileable fog image.
#[derive(Debug, Clone, PartialEq)]
pub struct FogTexture {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl FogTexture {
    /// Take the alpha channel of an RGBA image. Returns `None` for an empty image.
    pub fn from_rgba(image: &RgbaImage) -> Option<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return None;
        }
        let alpha = image.pixels().map(|p| p.0[3]).collect();
        Some(Self { width, height, alpha })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn alpha_at(&self, x: u32, y: u32) -> u8 {
        let tx = (x % self.width) as usize;
        let ty = (y % self.height) as usize;
        self.alpha[ty * self.width as usize + tx]
    }
}

/// How a fresh mask is filled before any reveal.
#[derive(Debug, Clone, PartialEq)]
pub enum FogFill {
    Solid,
    Textured {
        texture: Arc<FogTexture>,
        overlay_alpha: u8,
    },
}

/// Pixel region of a mask, with exclusive `x1` and `y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl DirtyRect {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    fn union(self, other: Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Largest brush radius a stamp is built for; larger requests are clamped.
pub const MAX_BRUSH_RADIUS: u32 = 1024;

/// Precomputed radial falloff for one radius and polarity.
///
/// A pixel at distance `d` from the centre belongs to ring `ceil(d)`.
/// Reveal removes `255 * (1 - ring / radius)`, so the centre clears fully
/// and the rim is untouched. Cover adds `255 * ring / radius`, where the
/// centre pixel counts as ring 1.
#[derive(Debug, Clone)]
pub struct BrushStamp {
    radius: u32,
    op: BrushOp,
    weights: Vec<u8>,
}

impl BrushStamp {
    pub fn new(radius: u32, op: BrushOp) -> Self {
        let radius = radius.clamp(1, MAX_BRUSH_RADIUS);
        let r = i64::from(radius);
        let side = (2 * r + 1) as usize;
        let mut weights = Vec::with_capacity(side * side);

        for dy in -r..=r {
            for dx in -r..=r {
                let distance = ((dx * dx + dy * dy) as f64).sqrt();
                if distance > r as f64 {
                    weights.push(0);
                    continue;
                }
                let ring = (distance.ceil() as u32).min(radius);
                let weight = match op {
                    BrushOp::Reveal => 255 * (radius - ring) / radius,
                    BrushOp::Cover => 255 * ring.max(1) / radius,
                };
                weights.push(weight as u8);
            }
        }

        Self { radius, op, weights }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn op(&self) -> BrushOp {
        self.op
    }

    fn weight(&self, dx: i64, dy: i64) -> u8 {
        let r = i64::from(self.radius);
        let side = 2 * r + 1;
        self.weights[((dy + r) * side + (dx + r)) as usize]
    }
}

/// Per-floor fog opacity plus the explored-centre record.
#[derive(Debug, Clone)]
pub struct FogMask {
    width: u32,
    height: u32,
    buffer: Vec<u8>,
    explored: BTreeSet<(u32, u32)>,
    fill: FogFill,
    revision: u64,
    /// Region changed since the last `take_dirty`.
    dirty: Option<DirtyRect>,
}

impl FogMask {
    pub const OPAQUE: u8 = 255;

    /// A fully fogged mask with nothing explored.
    pub fn opaque(width: u32, height: u32) -> Self {
        Self::with_fill(width, height, FogFill::Solid)
    }

    /// A mask tiled with `texture`'s alpha scaled by `overlay_alpha`, or a
    /// solid one when no texture is available.
    pub fn from_texture(width: u32, height: u32, texture: Option<Arc<FogTexture>>, overlay_alpha: u8) -> Self {
        match texture {
            Some(texture) => Self::with_fill(
                width,
                height,
                FogFill::Textured {
                    texture,
                    overlay_alpha,
                },
            ),
            None => Self::opaque(width, height),
        }
    }

    fn with_fill(width: u32, height: u32, fill: FogFill) -> Self {
        let mut mask = Self {
            width,
            height,
            buffer: vec![Self::OPAQUE; width as usize * height as usize],
            explored: BTreeSet::new(),
            fill,
            revision: 0,
            dirty: None,
        };
        mask.paint_fill();
        mask
    }

    fn paint_fill(&mut self) {
        self.mark_dirty(DirtyRect {
            x0: 0,
            y0: 0,
            x1: self.width,
            y1: self.height,
        });
        match &self.fill {
            FogFill::Solid => self.buffer.fill(Self::OPAQUE),
            FogFill::Textured {
                texture,
                overlay_alpha,
            } => {
                let overlay = u32::from(*overlay_alpha);
                for y in 0..self.height {
                    let row = y as usize * self.width as usize;
                    for x in 0..self.width {
                        let alpha = u32::from(texture.alpha_at(x, y)) * overlay / 255;
                        self.buffer[row + x as usize] = alpha as u8;
                    }
                }
            }
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn fill(&self) -> &FogFill {
        &self.fill
    }

    /// Opacity at a mask pixel, `None` outside the mask.
    pub fn opacity(&self, x: u32, y: u32) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.buffer[self.index(x, y)])
        } else {
            None
        }
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn explored(&self) -> &BTreeSet<(u32, u32)> {
        &self.explored
    }

    pub fn is_explored(&self, point: (u32, u32)) -> bool {
        self.explored.contains(&point)
    }

    /// Bumped on every buffer change so renderers know when to re-upload.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Region changed since the previous call, if any.
    pub fn take_dirty(&mut self) -> Option<DirtyRect> {
        self.dirty.take()
    }

    fn mark_dirty(&mut self, rect: DirtyRect) {
        self.dirty = Some(match self.dirty {
            Some(dirty) => dirty.union(rect),
            None => rect,
        });
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn contains(&self, (x, y): (u32, u32)) -> bool {
        x < self.width && y < self.height
    }

    /// Apply one brush dab centred on `center`.
    ///
    /// Centres outside the mask are ignored. Returns whether anything was applied.
    pub fn apply_brush(&mut self, center: (u32, u32), radius: u32, op: BrushOp) -> bool {
        self.apply_stamp(center, &BrushStamp::new(radius, op))
    }

    /// Like `apply_brush`, reusing a precomputed stamp.
    pub fn apply_stamp(&mut self, center: (u32, u32), stamp: &BrushStamp) -> bool {
        if !self.contains(center) {
            return false;
        }

        let r = i64::from(stamp.radius());
        let (cx, cy) = (i64::from(center.0), i64::from(center.1));
        let x0 = (cx - r).max(0);
        let x1 = (cx + r).min(i64::from(self.width) - 1);
        let y0 = (cy - r).max(0);
        let y1 = (cy + r).min(i64::from(self.height) - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let weight = stamp.weight(x - cx, y - cy);
                if weight == 0 {
                    continue;
                }
                let idx = self.index(x as u32, y as u32);
                let px = &mut self.buffer[idx];
                *px = match stamp.op() {
                    BrushOp::Reveal => px.saturating_sub(weight),
                    BrushOp::Cover => px.saturating_add(weight),
                };
            }
        }

        self.mark_dirty(DirtyRect {
            x0: x0 as u32,
            y0: y0 as u32,
            x1: x1 as u32 + 1,
            y1: y1 as u32 + 1,
        });
        match stamp.op() {
            BrushOp::Reveal => self.explored.insert(center),
            BrushOp::Cover => self.explored.remove(&center),
        };
        self.revision += 1;
        true
    }

    /// Reset to the initial fill and reveal every centre in `explored` at
    /// `radius`. Centres outside the mask are dropped. Returns how many
    /// centres were applied.
    pub fn rebuild_from_explored<I>(&mut self, explored: I, radius: u32) -> usize
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        self.paint_fill();
        self.explored.clear();

        let stamp = BrushStamp::new(radius, BrushOp::Reveal);
        let mut applied = 0;
        for center in explored {
            if self.apply_stamp(center, &stamp) {
                applied += 1;
            }
        }
        self.revision += 1;
        applied
    }

    /// Draw black fog over `background` using the buffer as alpha.
    ///
    /// The background is treated as opaque. Pixels outside the mask are
    /// fully fogged.
    pub fn compose(&self, background: &RgbaImage) -> RgbaImage {
        let (width, height) = background.dimensions();
        RgbaImage::from_fn(width, height, |x, y| self.composed_pixel(background, x, y))
    }

    /// `compose` restricted to `rect`, which must lie inside `background`.
    pub fn compose_region(&self, background: &RgbaImage, rect: DirtyRect) -> RgbaImage {
        RgbaImage::from_fn(rect.width(), rect.height(), |x, y| {
            self.composed_pixel(background, rect.x0 + x, rect.y0 + y)
        })
    }

    fn composed_pixel(&self, background: &RgbaImage, x: u32, y: u32) -> Rgba<u8> {
        let fog = u32::from(self.opacity(x, y).unwrap_or(Self::OPAQUE));
        let clear = 255 - fog;
        let [r, g, b, _] = background.get_pixel(x, y).0;
        Rgba([
            (u32::from(r) * clear / 255) as u8,
            (u32::from(g) * clear / 255) as u8,
            (u32::from(b) * clear / 255) as u8,
            255,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_mask_is_fully_fogged() {
        let mask = FogMask::opaque(16, 8);
        assert_eq!(mask.dimensions(), (16, 8));
        assert_eq!(mask.buffer().len(), 128);
        assert!(mask.buffer().iter().all(|&a| a == 255));
        assert!(mask.explored().is_empty());
    }

    #[test]
    fn test_texture_tiles_and_applies_overlay() {
        let tile = RgbaImage::from_fn(2, 2, |x, y| Rgba([9, 9, 9, if (x + y) % 2 == 0 { 255 } else { 0 }]));
        let texture = Arc::new(FogTexture::from_rgba(&tile).unwrap());
        let mask = FogMask::from_texture(5, 3, Some(texture), 180);

        assert_eq!(mask.opacity(0, 0), Some(180));
        assert_eq!(mask.opacity(1, 0), Some(0));
        assert_eq!(mask.opacity(2, 0), Some(180));
        assert_eq!(mask.opacity(3, 1), Some(180));
        assert_eq!(mask.opacity(4, 2), Some(180));
    }

    #[test]
    fn test_missing_texture_falls_back_to_solid() {
        let mask = FogMask::from_texture(4, 4, None, 180);
        assert_eq!(mask.fill(), &FogFill::Solid);
        assert!(mask.buffer().iter().all(|&a| a == 255));
        assert!(FogTexture::from_rgba(&RgbaImage::new(0, 0)).is_none());
    }

    #[test]
    fn test_reveal_then_cover_scenario() {
        let mut mask = FogMask::opaque(100, 100);

        assert!(mask.apply_brush((50, 50), 10, BrushOp::Reveal));
        assert_eq!(mask.opacity(50, 50), Some(0));
        // Exactly on the rim: no contribution.
        assert_eq!(mask.opacity(50, 60), Some(255));
        // Outside the brush entirely.
        assert_eq!(mask.opacity(50, 61), Some(255));
        // Half way out is partly cleared.
        let mid = mask.opacity(50, 55).unwrap();
        assert!(mid > 0 && mid < 255);
        assert!(mask.is_explored((50, 50)));

        assert!(mask.apply_brush((50, 50), 10, BrushOp::Cover));
        assert!(!mask.is_explored((50, 50)));
        assert!(mask.opacity(50, 50).unwrap() > 0);
        assert_eq!(mask.opacity(50, 60), Some(255));
    }

    #[test]
    fn test_falloff_grows_toward_centre() {
        let mut mask = FogMask::opaque(41, 41);
        mask.apply_brush((20, 20), 10, BrushOp::Reveal);

        let mut previous = 0;
        for dx in 0..=10 {
            let value = mask.opacity(20 + dx, 20).unwrap();
            assert!(value >= previous, "opacity must not drop moving outward");
            previous = value;
        }
    }

    #[test]
    fn test_reveal_removes_its_ring_weight() {
        let mut mask = FogMask::opaque(41, 41);
        mask.apply_brush((20, 20), 10, BrushOp::Reveal);

        let row: Vec<u8> = (0..=10).map(|dx| mask.opacity(20 + dx, 20).unwrap()).collect();
        assert_eq!(row, vec![0, 26, 51, 77, 102, 128, 153, 179, 204, 230, 255]);
    }

    #[test]
    fn test_cover_adds_its_ring_weight() {
        let clear = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let texture = Arc::new(FogTexture::from_rgba(&clear).unwrap());
        let mut mask = FogMask::from_texture(41, 41, Some(texture), 0);
        assert!(mask.buffer().iter().all(|&a| a == 0));

        mask.apply_brush((20, 20), 10, BrushOp::Cover);
        let row: Vec<u8> = (0..=10).map(|dx| mask.opacity(20 + dx, 20).unwrap()).collect();
        assert_eq!(row, vec![25, 25, 51, 76, 102, 127, 153, 178, 204, 229, 255]);
    }

    #[test]
    fn test_oversized_radius_is_clamped() {
        let stamp = BrushStamp::new(u32::MAX, BrushOp::Reveal);
        assert_eq!(stamp.radius(), MAX_BRUSH_RADIUS);

        let mut mask = FogMask::opaque(4, 4);
        assert!(mask.apply_brush((1, 1), u32::MAX, BrushOp::Reveal));
        assert_eq!(mask.opacity(1, 1), Some(0));
    }

    #[test]
    fn test_dab_marks_clipped_region_dirty() {
        let mut mask = FogMask::opaque(20, 20);
        mask.take_dirty();

        mask.apply_brush((2, 15), 4, BrushOp::Reveal);
        mask.apply_brush((5, 17), 2, BrushOp::Cover);
        assert_eq!(
            mask.take_dirty(),
            Some(DirtyRect {
                x0: 0,
                y0: 11,
                x1: 8,
                y1: 20
            })
        );
        assert_eq!(mask.take_dirty(), None);

        assert!(!mask.apply_brush((40, 40), 4, BrushOp::Reveal));
        assert_eq!(mask.take_dirty(), None);
    }

    #[test]
    fn test_rebuild_marks_whole_mask_dirty() {
        let mut mask = FogMask::opaque(12, 9);
        mask.take_dirty();
        mask.rebuild_from_explored([(3, 3)], 2);
        let dirty = mask.take_dirty().unwrap();
        assert_eq!((dirty.x0, dirty.y0, dirty.width(), dirty.height()), (0, 0, 12, 9));
    }

    #[test]
    fn test_compose_region_matches_full_compose() {
        let background = RgbaImage::from_fn(16, 12, |x, y| Rgba([(x * 10) as u8, (y * 20) as u8, 90, 255]));
        let mut mask = FogMask::opaque(16, 12);
        mask.take_dirty();
        mask.apply_brush((8, 6), 5, BrushOp::Reveal);

        let rect = mask.take_dirty().unwrap();
        let full = mask.compose(&background);
        let region = mask.compose_region(&background, rect);
        let expected = image::imageops::crop_imm(&full, rect.x0, rect.y0, rect.width(), rect.height()).to_image();
        assert_eq!(region, expected);
    }

    #[test]
    fn test_explored_membership_is_idempotent() {
        let mut once = FogMask::opaque(32, 32);
        once.apply_brush((10, 10), 5, BrushOp::Reveal);

        let mut twice = FogMask::opaque(32, 32);
        twice.apply_brush((10, 10), 5, BrushOp::Reveal);
        twice.apply_brush((10, 10), 5, BrushOp::Reveal);
        assert_eq!(once.explored(), twice.explored());

        once.apply_brush((10, 10), 5, BrushOp::Cover);
        twice.apply_brush((10, 10), 5, BrushOp::Cover);
        twice.apply_brush((10, 10), 5, BrushOp::Cover);
        assert_eq!(once.explored(), twice.explored());
        assert!(twice.explored().is_empty());
    }

    #[test]
    fn test_repeated_strokes_saturate() {
        let mut mask = FogMask::opaque(20, 20);
        for _ in 0..10 {
            mask.apply_brush((10, 10), 6, BrushOp::Reveal);
        }
        assert_eq!(mask.opacity(10, 10), Some(0));
        for _ in 0..10 {
            mask.apply_brush((10, 10), 6, BrushOp::Cover);
        }
        assert_eq!(mask.opacity(10, 10), Some(255));
    }

    #[test]
    fn test_out_of_bounds_centre_is_ignored() {
        let mut mask = FogMask::opaque(10, 10);
        let before = mask.buffer().to_vec();

        assert!(!mask.apply_brush((10, 3), 4, BrushOp::Reveal));
        assert!(!mask.apply_brush((3, 99), 4, BrushOp::Reveal));
        assert_eq!(mask.buffer(), before.as_slice());
        assert!(mask.explored().is_empty());
        assert_eq!(mask.revision(), 0);
    }

    #[test]
    fn test_brush_is_clipped_at_edges() {
        let mut mask = FogMask::opaque(10, 10);
        assert!(mask.apply_brush((0, 0), 5, BrushOp::Reveal));
        assert_eq!(mask.opacity(0, 0), Some(0));
        assert_eq!(mask.opacity(9, 9), Some(255));

        assert!(mask.apply_brush((9, 9), 5, BrushOp::Reveal));
        assert_eq!(mask.opacity(9, 9), Some(0));
    }

    #[test]
    fn test_rebuild_is_order_independent() {
        let points = vec![(5, 5), (12, 7), (8, 14), (30, 30), (6, 6)];
        let mut reversed = points.clone();
        reversed.reverse();

        let mut a = FogMask::opaque(40, 40);
        let mut b = FogMask::opaque(40, 40);
        assert_eq!(a.rebuild_from_explored(points, 6), 5);
        assert_eq!(b.rebuild_from_explored(reversed, 6), 5);

        assert_eq!(a.buffer(), b.buffer());
        assert_eq!(a.explored(), b.explored());
    }

    #[test]
    fn test_rebuild_resets_previous_strokes_and_drops_outside_points() {
        let mut mask = FogMask::opaque(20, 20);
        mask.apply_brush((3, 3), 4, BrushOp::Reveal);

        let applied = mask.rebuild_from_explored(vec![(15, 15), (25, 2)], 4);
        assert_eq!(applied, 1);
        assert_eq!(mask.opacity(3, 3), Some(255));
        assert_eq!(mask.opacity(15, 15), Some(0));
        assert_eq!(mask.explored().len(), 1);
        assert!(mask.is_explored((15, 15)));
    }

    #[test]
    fn test_rebuild_keeps_textured_fill() {
        let tile = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 255]));
        let texture = Arc::new(FogTexture::from_rgba(&tile).unwrap());
        let mut mask = FogMask::from_texture(12, 12, Some(texture), 180);

        mask.rebuild_from_explored(vec![(2, 2)], 1);
        assert_eq!(mask.opacity(2, 2), Some(0));
        assert_eq!(mask.opacity(10, 10), Some(180));
    }

    #[test]
    fn test_compose_darkens_fogged_pixels() {
        let background = RgbaImage::from_pixel(4, 4, Rgba([200, 100, 50, 255]));
        let mut mask = FogMask::opaque(4, 4);
        mask.apply_brush((1, 1), 1, BrushOp::Reveal);

        let out = mask.compose(&background);
        assert_eq!(out.get_pixel(1, 1).0, [200, 100, 50, 255]);
        assert_eq!(out.get_pixel(3, 3).0, [0, 0, 0, 255]);
        // Compose is read-only.
        assert_eq!(mask.opacity(3, 3), Some(255));
    }
}
