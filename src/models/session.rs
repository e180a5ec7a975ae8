// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session state management.
//!
//! The session owns every loaded floor, tracks which one is active, holds
//! the shared brush settings and dispatches intents to the active floor.

use super::floor::{Floor, FloorId, FloorStatus};
use super::fog::{BrushOp, FogTexture};
use super::intent::{Intent, Outcome};
use crate::config::ViewerConfig;
use crate::error::{PersistenceError, SessionError};
use crate::io::{media, serialization};
use crate::util::geometry::{zoom_at, ScreenPoint, Viewport, ZoomDirection, ZoomLimits};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Brush radius in image pixels with its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushSettings {
    radius: u32,
    min: u32,
    max: u32,
    step: u32,
}

impl BrushSettings {
    pub fn new(radius: u32, min: u32, max: u32, step: u32) -> Self {
        Self {
            radius: radius.clamp(min, max),
            min,
            max,
            step,
        }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn grow(&mut self) {
        self.radius = self.radius.saturating_add(self.step).min(self.max);
    }

    pub fn shrink(&mut self) {
        self.radius = self.radius.saturating_sub(self.step).max(self.min);
    }
}

/// How a new floor's fog was initialised.
#[derive(Debug)]
pub enum Restore {
    /// No saved record; the floor starts fully fogged.
    Fresh,
    /// A saved record was applied.
    Restored { centres: usize },
    /// The saved record could not be read; the floor starts fully fogged.
    Discarded(PersistenceError),
}

/// Result of adding a floor.
#[derive(Debug)]
pub struct AddedFloor {
    pub id: FloorId,
    pub index: usize,
    pub restore: Restore,
}

/// All floors plus the shared brush state.
pub struct Session {
    floors: Vec<Floor>,
    active: Option<usize>,
    brush: BrushSettings,
    mode: BrushOp,
    zoom: ZoomLimits,
    viewport: Viewport,
    fog_texture: Option<Arc<FogTexture>>,
    overlay_alpha: u8,
    show_help: bool,
    next_id: u64,
}

impl Session {
    /// Create an empty session from the viewer settings.
    pub fn new(config: &ViewerConfig, fog_texture: Option<FogTexture>) -> Self {
        let window = &config.window;
        let brush = &config.brush;
        Self {
            floors: Vec::new(),
            active: None,
            brush: BrushSettings::new(brush.initial, brush.min, brush.max, brush.step),
            mode: BrushOp::Reveal,
            zoom: config.zoom_limits(),
            viewport: Viewport {
                width: window.width,
                height: (window.height - window.tab_height).max(1.0),
                ui_offset: window.tab_height,
            },
            fog_texture: fog_texture.map(Arc::new),
            overlay_alpha: config.fog.overlay_alpha,
            show_help: true,
            next_id: 0,
        }
    }

    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }

    /// Index of the active floor; `None` exactly when there are no floors.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_floor(&self) -> Option<&Floor> {
        self.active.and_then(|i| self.floors.get(i))
    }

    pub fn active_floor_mut(&mut self) -> Option<&mut Floor> {
        match self.active {
            Some(i) => self.floors.get_mut(i),
            None => None,
        }
    }

    pub fn status_of(&self, index: usize) -> Option<FloorStatus> {
        if index >= self.floors.len() {
            None
        } else if Some(index) == self.active {
            Some(FloorStatus::Active)
        } else {
            Some(FloorStatus::Background)
        }
    }

    pub fn brush_radius(&self) -> u32 {
        self.brush.radius()
    }

    pub fn mode(&self) -> BrushOp {
        self.mode
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Load an image and add it as a floor.
    ///
    /// An unreadable image leaves the session untouched.
    pub fn add_floor(&mut self, path: &Path) -> Result<AddedFloor, SessionError> {
        let image = media::load_image(path)?;
        Ok(self.add_loaded(path, image))
    }

    /// Add a floor for an already decoded image, restoring its saved record
    /// if there is one. The first floor becomes active.
    pub fn add_loaded(&mut self, path: &Path, image: RgbaImage) -> AddedFloor {
        let id = FloorId(self.next_id);
        self.next_id += 1;

        let mut floor = Floor::new(id, path, image, self.fog_texture.clone(), self.overlay_alpha);
        floor.fit_to(&self.viewport);

        let restore = match serialization::load_for_image(path) {
            Ok(Some(record)) => {
                let centres = floor.restore(&record, self.brush.radius(), &self.zoom);
                if centres < record.explored_areas.len() {
                    log::warn!(
                        "Dropped {} explored points outside {}",
                        record.explored_areas.len() - centres,
                        path.display()
                    );
                }
                Restore::Restored { centres }
            }
            Ok(None) => Restore::Fresh,
            Err(e) => {
                floor.set_record_guarded(true);
                Restore::Discarded(e)
            }
        };

        let (width, height) = floor.dimensions();
        log::info!("Added floor '{}' ({}x{}) from {}", floor.name(), width, height, path.display());

        self.floors.push(floor);
        let index = self.floors.len() - 1;
        if self.active.is_none() {
            self.active = Some(index);
        }

        AddedFloor { id, index, restore }
    }

    /// Remove a floor without saving it. The active floor stays the same
    /// when another floor is removed; removing the active floor selects its
    /// nearest neighbour.
    pub fn remove_floor(&mut self, index: usize) -> Result<Floor, SessionError> {
        let len = self.floors.len();
        if index >= len {
            return Err(SessionError::InvalidFloorIndex { index, len });
        }

        let removed = self.floors.remove(index);
        self.active = match self.active {
            _ if self.floors.is_empty() => None,
            Some(active) if active > index => Some(active - 1),
            Some(active) => Some(active.min(self.floors.len() - 1)),
            None => Some(0),
        };
        if let Some(i) = self.active {
            let viewport = self.viewport;
            self.floors[i].fit_to(&viewport);
        }

        log::info!("Removed floor '{}', {} remaining", removed.name(), self.floors.len());
        Ok(removed)
    }

    /// Make another floor active. An invalid index changes nothing.
    pub fn set_active(&mut self, index: usize) -> Result<(), SessionError> {
        let len = self.floors.len();
        if index >= len {
            return Err(SessionError::InvalidFloorIndex { index, len });
        }
        self.active = Some(index);
        let viewport = self.viewport;
        self.floors[index].fit_to(&viewport);
        log::info!("Switched to floor '{}'", self.floors[index].name());
        Ok(())
    }

    /// Switch to the next floor, wrapping at the end.
    pub fn cycle_floor(&mut self) -> Result<(), SessionError> {
        match self.active {
            Some(active) => self.set_active((active + 1) % self.floors.len()),
            None => Err(SessionError::NoActiveFloor),
        }
    }

    /// Apply a brush dab under a screen position. Returns whether the point
    /// hit the active floor's image.
    pub fn stroke_at(&mut self, at: ScreenPoint, op: BrushOp) -> bool {
        let radius = self.brush.radius();
        let viewport = self.viewport;
        let Some(floor) = self.active_floor_mut() else {
            return false;
        };

        let (width, height) = floor.dimensions();
        let Some(center) = floor.transform(&viewport).to_floor_space(at).within(width, height) else {
            return false;
        };
        log::debug!("{:?} at {:?} r={}", op, center, radius);
        floor.mask_mut().apply_brush(center, radius, op)
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        if let Some(floor) = self.active_floor_mut() {
            let view = floor.view_mut();
            view.pan_offset[0] = view.pan_offset[0].saturating_add(dx);
            view.pan_offset[1] = view.pan_offset[1].saturating_add(dy);
        }
    }

    pub fn zoom(&mut self, direction: ZoomDirection) {
        let limits = self.zoom;
        if let Some(floor) = self.active_floor_mut() {
            zoom_at(floor.view_mut(), direction, &limits);
            log::debug!("Zoom {:.0}%", floor.view().zoom_factor * 100.0);
        }
    }

    pub fn grow_brush(&mut self) {
        self.brush.grow();
    }

    pub fn shrink_brush(&mut self) {
        self.brush.shrink();
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.inverse();
    }

    /// Track a new map area and refit the active floor to it.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport || viewport.width <= 0.0 || viewport.height <= 0.0 {
            return;
        }
        self.viewport = viewport;
        if let Some(floor) = self.active_floor_mut() {
            floor.fit_to(&viewport);
        }
    }

    /// Save the active floor, even if its previous record was unreadable.
    pub fn save_active(&mut self) -> Result<PathBuf, SessionError> {
        let floor = self.active_floor_mut().ok_or(SessionError::NoActiveFloor)?;
        let record = floor.record();
        let path = serialization::save_for_image(&record, floor.image_path())?;
        floor.set_record_guarded(false);
        log::info!("Saved {} explored points to {}", record.explored_areas.len(), path.display());
        Ok(path)
    }

    /// Save every floor. Floors whose previous record was unreadable are
    /// skipped so it is not overwritten. Returns how many were written.
    pub fn save_all(&self) -> Result<usize, SessionError> {
        let mut saved = 0;
        let mut failed = 0;

        for floor in &self.floors {
            if floor.is_record_guarded() {
                log::warn!(
                    "Not overwriting unreadable record for '{}'; save it explicitly to replace it",
                    floor.name()
                );
                continue;
            }
            let record = floor.record();
            match serialization::save_for_image(&record, floor.image_path()) {
                Ok(path) => {
                    log::info!("Saved {} explored points to {}", record.explored_areas.len(), path.display());
                    saved += 1;
                }
                Err(e) => {
                    log::error!("Failed to save floor '{}': {}", floor.name(), e);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            Err(SessionError::SaveAll {
                failed,
                total: self.floors.len(),
            })
        } else {
            Ok(saved)
        }
    }

    /// Dispatch one intent.
    pub fn apply(&mut self, intent: Intent) -> Result<Outcome, SessionError> {
        match intent {
            Intent::Stroke { at, op } => {
                self.stroke_at(at, op);
            }
            Intent::Pan { dx, dy } => self.pan(dx, dy),
            Intent::Zoom(direction) => self.zoom(direction),
            Intent::GrowBrush => self.grow_brush(),
            Intent::ShrinkBrush => self.shrink_brush(),
            Intent::ToggleMode => self.toggle_mode(),
            Intent::AddFloor { path, image } => {
                let added = self.add_loaded(&path, image);
                if let Restore::Discarded(e) = added.restore {
                    return Err(e.into());
                }
            }
            Intent::RemoveActiveFloor => {
                let index = self.active.ok_or(SessionError::NoActiveFloor)?;
                self.remove_floor(index)?;
            }
            Intent::SwitchFloor(index) => self.set_active(index)?,
            Intent::CycleFloor => self.cycle_floor()?,
            Intent::SaveActive => {
                self.save_active()?;
            }
            Intent::SaveAll => {
                self.save_all()?;
            }
            Intent::ToggleHelp => self.show_help = !self.show_help,
            Intent::Resize(viewport) => self.resize(viewport),
            Intent::Exit => {
                if let Err(e) = self.save_all() {
                    log::error!("Exiting with unsaved floors: {}", e);
                }
                return Ok(Outcome::Exit);
            }
        }
        Ok(Outcome::Continue)
    }
}
