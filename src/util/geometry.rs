// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pan/zoom coordinate mapping.
//!
//! This module converts pointer positions between screen space and floor
//! (image) space. A floor is drawn centred in the map viewport at
//! `base_scale * zoom_factor`, shifted by its pan offset and pushed down by
//! the tab band that sits above the viewport.

use crate::models::floor::ViewState;

/// A position in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A pixel position in floor space. Not clamped: points outside the image
/// are a normal result when the pointer is off the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloorPoint {
    pub x: i64,
    pub y: i64,
}

impl FloorPoint {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The point as mask coordinates, if it lies within `width x height`.
    pub fn within(self, width: u32, height: u32) -> Option<(u32, u32)> {
        let inside_x = self.x >= 0 && self.x < i64::from(width);
        let inside_y = self.y >= 0 && self.y < i64::from(height);
        if inside_x && inside_y {
            Some((self.x as u32, self.y as u32))
        } else {
            None
        }
    }
}

/// The map area of the window.
///
/// `ui_offset` is the height of the tab band above the map; it shifts the
/// vertical axis only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub ui_offset: f32,
}

/// Scale that fits a `width x height` image entirely inside the viewport.
pub fn base_scale(viewport: &Viewport, width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        return 1.0;
    }
    let fit = (viewport.width / width as f32).min(viewport.height / height as f32);
    if fit.is_finite() && fit > 0.0 {
        fit
    } else {
        1.0
    }
}

/// Mapping between screen and floor space for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    scale: f32,
    origin: ScreenPoint,
    scaled_size: (f32, f32),
}

impl Transform {
    /// Build the mapping for an image of `dimensions` shown with `view`.
    pub fn new(viewport: &Viewport, dimensions: (u32, u32), base_scale: f32, view: &ViewState) -> Self {
        let scale = base_scale * view.zoom_factor;
        let scaled_size = (dimensions.0 as f32 * scale, dimensions.1 as f32 * scale);
        let origin = ScreenPoint {
            x: (viewport.width - scaled_size.0) / 2.0 + view.pan_offset[0] as f32,
            y: (viewport.height - scaled_size.1) / 2.0 + view.pan_offset[1] as f32 + viewport.ui_offset,
        };
        Self {
            scale,
            origin,
            scaled_size,
        }
    }

    /// Screen pixels per floor pixel.
    pub fn effective_scale(&self) -> f32 {
        self.scale
    }

    /// Screen position of the image's top-left corner.
    pub fn origin(&self) -> ScreenPoint {
        self.origin
    }

    /// On-screen size of the whole image.
    pub fn scaled_size(&self) -> (f32, f32) {
        self.scaled_size
    }

    /// Map a screen point into floor space, truncating to whole pixels.
    ///
    /// Truncation rounds toward negative infinity so a pointer just left of
    /// or above the image never lands on column or row 0.
    pub fn to_floor_space(&self, point: ScreenPoint) -> FloorPoint {
        let x = ((point.x - self.origin.x) / self.scale).floor();
        let y = ((point.y - self.origin.y) / self.scale).floor();
        FloorPoint::new(x as i64, y as i64)
    }

    /// Screen position of a floor pixel's top-left corner.
    pub fn to_screen_space(&self, point: FloorPoint) -> ScreenPoint {
        ScreenPoint {
            x: self.origin.x + point.x as f32 * self.scale,
            y: self.origin.y + point.y as f32 * self.scale,
        }
    }
}

/// Which way a zoom step goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Zoom bounds and the relative step applied per zoom action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ZoomLimits {
    pub fn clamp(&self, zoom: f32) -> f32 {
        if zoom.is_finite() {
            zoom.clamp(self.min, self.max)
        } else {
            1.0_f32.clamp(self.min, self.max)
        }
    }
}

/// Multiply (zoom in) or divide (zoom out) the zoom factor by `1 + step`,
/// clamped to the limits. Zoom stays centred on the viewport plus pan.
pub fn zoom_at(view: &mut ViewState, direction: ZoomDirection, limits: &ZoomLimits) {
    let factor = 1.0 + limits.step;
    let zoom = match direction {
        ZoomDirection::In => view.zoom_factor * factor,
        ZoomDirection::Out => view.zoom_factor / factor,
    };
    view.zoom_factor = limits.clamp(zoom);
}
