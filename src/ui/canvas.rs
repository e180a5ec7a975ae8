// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Map canvas.
//!
//! This module draws the active floor (background with fog already
//! composited) and turns pointer input over the map into intents.

use crate::models::{fog::BrushOp, intent::Intent, session::Session};
use crate::util::geometry::{ScreenPoint, Viewport, ZoomDirection};

/// Input gathered from the canvas this frame.
#[derive(Default)]
pub struct CanvasInput {
    pub intents: Vec<Intent>,
    /// Middle-button drag in screen points, not yet rounded to pixels.
    pub pan: egui::Vec2,
}

/// Display the map area and collect pointer input.
pub fn show(ui: &mut egui::Ui, session: &Session, texture: Option<&egui::TextureHandle>) -> CanvasInput {
    let mut input = CanvasInput::default();

    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
    let rect = response.rect;
    painter.rect_filled(rect, 0.0, egui::Color32::BLACK);

    let viewport = Viewport {
        width: rect.width(),
        height: rect.height(),
        ui_offset: rect.min.y,
    };
    if &viewport != session.viewport() {
        input.intents.push(Intent::Resize(viewport));
    }

    let Some(floor) = session.active_floor() else {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "No map loaded - press O to open one",
            egui::FontId::proportional(18.0),
            egui::Color32::from_gray(180),
        );
        return input;
    };

    let transform = floor.transform(&viewport);
    let origin = transform.origin();
    let (width, height) = transform.scaled_size();
    let image_rect = egui::Rect::from_min_size(egui::pos2(origin.x, origin.y), egui::vec2(width, height));

    if let Some(texture) = texture {
        painter.image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }

    // Brushing follows pointer motion so a held, stationary button does
    // not keep stacking dabs.
    let (moved, primary, secondary) = ui.input(|i| {
        (
            i.pointer.delta() != egui::Vec2::ZERO || i.pointer.any_pressed(),
            i.pointer.primary_down(),
            i.pointer.secondary_down(),
        )
    });
    if response.is_pointer_button_down_on() && moved {
        if let Some(pos) = response.interact_pointer_pos() {
            let at = ScreenPoint::new(pos.x, pos.y);
            if primary {
                input.intents.push(Intent::Stroke { at, op: session.mode() });
            } else if secondary {
                input.intents.push(Intent::Stroke {
                    at,
                    op: session.mode().inverse(),
                });
            }
        }
    }

    if response.dragged_by(egui::PointerButton::Middle) {
        input.pan += response.drag_delta();
    }

    if response.hovered() {
        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        if scroll > 0.0 {
            input.intents.push(Intent::Zoom(ZoomDirection::In));
        } else if scroll < 0.0 {
            input.intents.push(Intent::Zoom(ZoomDirection::Out));
        }

        // Brush outline at its on-screen size.
        if let Some(pos) = response.hover_pos() {
            let radius = session.brush_radius() as f32 * transform.effective_scale();
            let color = match session.mode() {
                BrushOp::Reveal => egui::Color32::from_rgb(230, 230, 230),
                BrushOp::Cover => egui::Color32::from_rgb(120, 160, 255),
            };
            painter.circle_stroke(pos, radius, egui::Stroke::new(1.0, color));
        }
    }

    input
}
