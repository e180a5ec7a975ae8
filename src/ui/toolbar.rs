// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Floor tab band.
//!
//! This module draws one tab per floor across the top of the window,
//! with buttons for opening another map and saving.

use crate::models::{floor::FloorStatus, session::Session};

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    SwitchFloor(usize),
    OpenMap,
    SaveAll,
}

/// Display the floor tabs.
pub fn show(ui: &mut egui::Ui, session: &Session, tab_width: f32) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let tab_size = egui::vec2(tab_width, ui.available_height());

    ui.horizontal_centered(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;

        for (index, floor) in session.floors().iter().enumerate() {
            let selected = session.status_of(index) == Some(FloorStatus::Active);
            let tab = egui::SelectableLabel::new(selected, floor.name());
            if ui.add_sized(tab_size, tab).on_hover_text(floor.image_path().display().to_string()).clicked() {
                action = ToolbarAction::SwitchFloor(index);
            }
        }

        ui.spacing_mut().item_spacing.x = 8.0;
        ui.separator();

        if ui.button("＋ Add floor").on_hover_text("O").clicked() {
            action = ToolbarAction::OpenMap;
        }
        if ui.button("💾 Save all").on_hover_text("Shift+S").clicked() {
            action = ToolbarAction::SaveAll;
        }
    });

    action
}
