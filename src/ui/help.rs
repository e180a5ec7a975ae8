// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Help and status overlay.
//!
//! Shows the brush size, brush mode and zoom of the active floor along
//! with the control reference. Toggled with H.

use crate::models::session::Session;

const CONTROLS: &[&str] = &[
    "Left Mouse: Paint in current mode",
    "Right Mouse: Paint in opposite mode",
    "Middle Mouse: Pan map",
    "Space: Toggle mode",
    "+/-: Adjust brush size",
    "Mouse Wheel: Zoom in/out",
    "Tab: Next floor",
    "H: Toggle controls",
    "O: Add new floor",
    "Delete: Remove current floor",
    "S: Save floor (Shift+S: all)",
    "Esc: Save all and exit",
];

/// Display the overlay below the tab band at `top`.
pub fn show(ctx: &egui::Context, session: &Session, top: f32) {
    let Some(floor) = session.active_floor() else {
        return;
    };

    egui::Area::new(egui::Id::new("help_overlay"))
        .fixed_pos(egui::pos2(10.0, top + 10.0))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style())
                .fill(egui::Color32::from_black_alpha(170))
                .show(ui, |ui| {
                    let strong = |text: String| egui::RichText::new(text).size(18.0).color(egui::Color32::WHITE);
                    ui.label(strong(format!("Brush Size: {}", session.brush_radius())));
                    ui.label(strong(format!("Mode: {}", session.mode().label())));
                    ui.label(strong(format!("Zoom: {:.0}%", floor.view().zoom_factor * 100.0)));
                    ui.add_space(8.0);

                    ui.label(egui::RichText::new("Controls:").color(egui::Color32::WHITE));
                    for line in CONTROLS {
                        ui.label(egui::RichText::new(*line).color(egui::Color32::from_gray(220)));
                    }
                });
        });
}
