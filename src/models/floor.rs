// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Floor state.
//!
//! A floor is one map image with its own fog mask and view. Its shape is
//! fixed at creation: only the mask contents and the view change afterwards.

use super::fog::{DirtyRect, FogMask, FogTexture};
use super::record::FloorRecord;
use crate::util::geometry::{base_scale, Transform, Viewport, ZoomLimits};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Stable identity of a floor within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FloorId(pub u64);

/// Pan and zoom of one floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Offset of the image centre from the viewport centre, in screen pixels.
    pub pan_offset: [i32; 2],
    pub zoom_factor: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            pan_offset: [0, 0],
            zoom_factor: 1.0,
        }
    }
}

/// Whether a floor is the one receiving input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorStatus {
    Active,
    Background,
}

/// One map image with its fog and view.
#[derive(Debug, Clone)]
pub struct Floor {
    id: FloorId,
    name: String,
    image_path: PathBuf,
    background: RgbaImage,
    mask: FogMask,
    view: ViewState,
    base_scale: f32,
    /// Set when the floor's saved record could not be parsed, so a bulk
    /// save does not replace it with this floor's fresh fog.
    record_guarded: bool,
}

impl Floor {
    /// Create a fully fogged floor for `background`, textured when a fog
    /// texture is given. The display name is the file stem of `image_path`.
    pub fn new(
        id: FloorId,
        image_path: &Path,
        background: RgbaImage,
        fog_texture: Option<Arc<FogTexture>>,
        overlay_alpha: u8,
    ) -> Self {
        let (width, height) = background.dimensions();
        let name = image_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("floor {}", id.0 + 1));

        Self {
            id,
            name,
            image_path: image_path.to_path_buf(),
            background,
            mask: FogMask::from_texture(width, height, fog_texture, overlay_alpha),
            view: ViewState::default(),
            base_scale: 1.0,
            record_guarded: false,
        }
    }

    pub fn id(&self) -> FloorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    /// Image size in pixels; the mask always has the same size.
    pub fn dimensions(&self) -> (u32, u32) {
        self.background.dimensions()
    }

    pub fn mask(&self) -> &FogMask {
        &self.mask
    }

    pub fn mask_mut(&mut self) -> &mut FogMask {
        &mut self.mask
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn base_scale(&self) -> f32 {
        self.base_scale
    }

    /// Recompute the fit-to-viewport scale.
    pub fn fit_to(&mut self, viewport: &Viewport) {
        let (width, height) = self.dimensions();
        self.base_scale = base_scale(viewport, width, height);
    }

    /// Screen/floor mapping for the current view.
    pub fn transform(&self, viewport: &Viewport) -> Transform {
        Transform::new(viewport, self.dimensions(), self.base_scale, &self.view)
    }

    /// Background with the fog drawn over it.
    pub fn compose(&self) -> RgbaImage {
        self.mask.compose(&self.background)
    }

    /// `compose` for just the pixels in `rect`.
    pub fn compose_region(&self, rect: DirtyRect) -> RgbaImage {
        self.mask.compose_region(&self.background, rect)
    }

    pub fn is_record_guarded(&self) -> bool {
        self.record_guarded
    }

    pub fn set_record_guarded(&mut self, guarded: bool) {
        self.record_guarded = guarded;
    }

    /// Snapshot of the state that gets persisted.
    pub fn record(&self) -> FloorRecord {
        FloorRecord {
            explored_areas: self.mask.explored().iter().copied().collect(),
            pan_offset: self.view.pan_offset,
            zoom_factor: self.view.zoom_factor,
        }
    }

    /// Rebuild the mask and view from a saved record, revealing each centre
    /// at `radius`. Returns how many centres were applied.
    pub fn restore(&mut self, record: &FloorRecord, radius: u32, zoom: &ZoomLimits) -> usize {
        let applied = self
            .mask
            .rebuild_from_explored(record.explored_areas.iter().copied(), radius);
        self.view.pan_offset = record.pan_offset;
        self.view.zoom_factor = zoom.clamp(record.zoom_factor);
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fog::BrushOp;
    use image::Rgba;

    const ZOOM: ZoomLimits = ZoomLimits {
        min: 0.1,
        max: 3.0,
        step: 0.1,
    };

    fn floor(width: u32, height: u32) -> Floor {
        let image = RgbaImage::from_pixel(width, height, Rgba([120, 120, 120, 255]));
        Floor::new(FloorId(0), Path::new("maps/cellar.png"), image, None, 180)
    }

    #[test]
    fn test_new_floor_is_fogged_and_named_from_file() {
        let floor = floor(64, 32);
        assert_eq!(floor.name(), "cellar");
        assert_eq!(floor.dimensions(), (64, 32));
        assert_eq!(floor.mask().dimensions(), floor.dimensions());
        assert!(floor.mask().buffer().iter().all(|&a| a == 255));
        assert_eq!(floor.view(), &ViewState::default());
    }

    #[test]
    fn test_name_is_settable() {
        let mut floor = floor(4, 4);
        floor.set_name("Upper deck");
        assert_eq!(floor.name(), "Upper deck");
        assert_eq!(floor.image_path(), Path::new("maps/cellar.png"));
    }

    #[test]
    fn test_fit_to_viewport() {
        let mut floor = floor(1600, 1200);
        floor.fit_to(&Viewport {
            width: 800.0,
            height: 560.0,
            ui_offset: 40.0,
        });
        assert!((floor.base_scale() - 0.466_666_67).abs() < 1e-5);
    }

    #[test]
    fn test_record_and_restore() {
        let mut source = floor(50, 50);
        source.mask_mut().apply_brush((10, 10), 5, BrushOp::Reveal);
        source.mask_mut().apply_brush((30, 40), 5, BrushOp::Reveal);
        source.view_mut().pan_offset = [12, -8];
        source.view_mut().zoom_factor = 1.7;

        let record = source.record();
        assert_eq!(record.explored_areas, vec![(10, 10), (30, 40)]);

        let mut restored = floor(50, 50);
        assert_eq!(restored.restore(&record, 5, &ZOOM), 2);
        assert_eq!(restored.mask().buffer(), source.mask().buffer());
        assert_eq!(restored.view(), source.view());
    }

    #[test]
    fn test_restore_clamps_zoom() {
        let mut floor = floor(10, 10);
        let mut record = FloorRecord::new(vec![]);
        record.zoom_factor = 40.0;
        floor.restore(&record, 5, &ZOOM);
        assert_eq!(floor.view().zoom_factor, 3.0);
    }
}
