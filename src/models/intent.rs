// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! User intents.
//!
//! The UI layer turns raw input into these commands; the session consumes
//! them without knowing which key or button produced them.

use super::fog::BrushOp;
use crate::util::geometry::{ScreenPoint, Viewport, ZoomDirection};
use image::RgbaImage;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Apply one brush dab under a screen position.
    Stroke { at: ScreenPoint, op: BrushOp },
    /// Move the active floor by a screen-pixel delta.
    Pan { dx: i32, dy: i32 },
    Zoom(ZoomDirection),
    GrowBrush,
    ShrinkBrush,
    /// Flip the default brush polarity.
    ToggleMode,
    /// Add a floor for a map decoded off the UI thread.
    AddFloor { path: PathBuf, image: RgbaImage },
    RemoveActiveFloor,
    SwitchFloor(usize),
    /// Switch to the next floor, wrapping around.
    CycleFloor,
    SaveActive,
    SaveAll,
    ToggleHelp,
    /// The map area of the window changed.
    Resize(Viewport),
    /// Save everything and quit.
    Exit,
}

/// What the event loop should do after an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}
