// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module owns the session and bridges it to egui: it turns keyboard
//! and canvas input into intents, uploads the composited floor as a texture
//! and decodes newly opened maps on a worker thread.

use crate::config::WindowConfig;
use crate::error::{MediaError, SessionError};
use crate::io::media;
use crate::models::{
    floor::FloorId,
    intent::{Intent, Outcome},
    session::{Restore, Session},
};
use crate::ui::{canvas, help, toolbar};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};

/// Result of background image loading operation.
struct LoadedMap {
    path: PathBuf,
    image: RgbaImage,
}

/// Texture of the active floor and the mask revision it was built from.
struct FloorTexture {
    floor: FloorId,
    revision: u64,
    handle: egui::TextureHandle,
}

fn color_image(image: &RgbaImage) -> egui::ColorImage {
    let size = [image.width() as usize, image.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw())
}

/// Ask the user for a map image. `None` if the dialog was cancelled.
pub fn pick_map_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select a map image")
        .add_filter("Image files", media::IMAGE_EXTENSIONS)
        .pick_file()
}

/// Human readable outcome of restoring a floor, if worth telling the user.
pub fn describe_restore(path: &Path, restore: &Restore) -> Option<String> {
    match restore {
        Restore::Fresh => {
            log::info!("No saved exploration for {}", path.display());
            None
        }
        Restore::Restored { centres } => {
            log::info!("Restored {} explored points for {}", centres, path.display());
            None
        }
        Restore::Discarded(e) => {
            log::error!("{}", e);
            Some(format!("{} - starting fully fogged", e))
        }
    }
}

/// Main application state.
pub struct FogMapApp {
    /// All floors and brush state
    session: Session,

    /// Size of each floor tab
    tab_size: egui::Vec2,

    /// Composited texture of the active floor
    texture: Option<FloorTexture>,

    /// Receiver for background image loading
    image_loader: Option<Receiver<Result<LoadedMap, MediaError>>>,

    /// Loading state message
    loading_message: Option<String>,

    /// Last error or confirmation shown in the status bar
    status: Option<String>,

    /// Sub-pixel pan not yet handed to the session
    pan_residual: egui::Vec2,

    /// Set once the exit save has run
    exited: bool,
}

impl FogMapApp {
    /// Create the application around an already populated session.
    pub fn new(session: Session, window: &WindowConfig, status: Option<String>) -> Self {
        Self {
            session,
            tab_size: egui::vec2(window.tab_width, window.tab_height),
            texture: None,
            image_loader: None,
            loading_message: None,
            status,
            pan_residual: egui::Vec2::ZERO,
            exited: false,
        }
    }

    /// Load a map file on a worker thread. The floor is only added to the
    /// session once fully decoded.
    fn load_map_file(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.image_loader = Some(receiver);
        self.loading_message = Some(format!("Loading {}...", path.display()));

        std::thread::spawn(move || {
            let result = media::load_image(&path).map(|image| {
                log::info!("Decoded {} ({}x{})", path.display(), image.width(), image.height());
                LoadedMap { path, image }
            });
            let _ = sender.send(result);
        });
    }

    fn open_map_dialog(&mut self) {
        if self.image_loader.is_some() {
            return;
        }
        if let Some(path) = pick_map_file() {
            self.load_map_file(path);
        }
    }

    fn poll_loader(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.image_loader else {
            return;
        };
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => {
                ctx.request_repaint();
                return;
            }
            Err(TryRecvError::Disconnected) => {
                log::error!("Map loader stopped without a result");
                self.image_loader = None;
                self.loading_message = None;
                self.status = Some("Loading the map failed unexpectedly".to_string());
                return;
            }
        };
        self.image_loader = None;
        self.loading_message = None;

        match result {
            Ok(loaded) => {
                log::info!("Adding floor {}", loaded.path.display());
                self.dispatch(
                    ctx,
                    Intent::AddFloor {
                        path: loaded.path,
                        image: loaded.image,
                    },
                );
            }
            Err(e) => {
                log::error!("{}", e);
                if self.session.is_empty() {
                    log::info!("No floors left to show, exiting");
                    self.exited = true;
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
                self.status = Some(e.to_string());
            }
        }
    }

    /// Hand an intent to the session and report the result.
    fn dispatch(&mut self, ctx: &egui::Context, intent: Intent) {
        let confirmation = match &intent {
            Intent::SaveActive => Some("Saved current floor"),
            Intent::SaveAll => Some("Saved all floors"),
            _ => None,
        };

        match self.session.apply(intent) {
            Ok(Outcome::Continue) => {
                if let Some(message) = confirmation {
                    self.status = Some(message.to_string());
                }
            }
            Ok(Outcome::Exit) => {
                self.exited = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Err(e) => self.report(e),
        }
    }

    fn report(&mut self, error: SessionError) {
        log::error!("{}", error);
        self.status = Some(error.to_string());
    }

    /// Map key presses to intents.
    fn keyboard_intents(ctx: &egui::Context) -> Vec<Intent> {
        if ctx.wants_keyboard_input() {
            return Vec::new();
        }

        ctx.input(|i| {
            let mut intents = Vec::new();
            if i.key_pressed(egui::Key::Escape) {
                intents.push(Intent::Exit);
            }
            if i.key_pressed(egui::Key::S) {
                intents.push(if i.modifiers.shift { Intent::SaveAll } else { Intent::SaveActive });
            }
            if i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals) {
                intents.push(Intent::GrowBrush);
            }
            if i.key_pressed(egui::Key::Minus) {
                intents.push(Intent::ShrinkBrush);
            }
            if i.key_pressed(egui::Key::Space) {
                intents.push(Intent::ToggleMode);
            }
            if i.key_pressed(egui::Key::H) {
                intents.push(Intent::ToggleHelp);
            }
            if i.key_pressed(egui::Key::Tab) {
                intents.push(Intent::CycleFloor);
            }
            if i.key_pressed(egui::Key::Delete) {
                intents.push(Intent::RemoveActiveFloor);
            }
            intents
        })
    }

    /// Re-upload the active floor when it changed since the last frame.
    /// Strokes on the same floor only upload the region they touched.
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let Some(floor) = self.session.active_floor_mut() else {
            self.texture = None;
            return;
        };
        let dirty = floor.mask_mut().take_dirty();
        let revision = floor.mask().revision();

        match &mut self.texture {
            Some(texture) if texture.floor == floor.id() => {
                if texture.revision == revision {
                    return;
                }
                match dirty {
                    Some(rect) => {
                        let patch = color_image(&floor.compose_region(rect));
                        let pos = [rect.x0 as usize, rect.y0 as usize];
                        texture.handle.set_partial(pos, patch, egui::TextureOptions::LINEAR);
                    }
                    None => texture.handle.set(color_image(&floor.compose()), egui::TextureOptions::LINEAR),
                }
                texture.revision = revision;
            }
            Some(texture) => {
                texture.handle.set(color_image(&floor.compose()), egui::TextureOptions::LINEAR);
                texture.floor = floor.id();
                texture.revision = revision;
            }
            None => {
                let image = color_image(&floor.compose());
                let handle = ctx.load_texture("active_floor", image, egui::TextureOptions::LINEAR);
                self.texture = Some(FloorTexture {
                    floor: floor.id(),
                    revision,
                    handle,
                });
            }
        }
    }

    /// Turn accumulated drag into whole-pixel pan steps.
    fn take_pan(&mut self, delta: egui::Vec2) -> Option<Intent> {
        self.pan_residual += delta;
        let dx = self.pan_residual.x.trunc();
        let dy = self.pan_residual.y.trunc();
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        self.pan_residual -= egui::vec2(dx, dy);
        Some(Intent::Pan {
            dx: dx as i32,
            dy: dy as i32,
        })
    }
}

impl eframe::App for FogMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader(ctx);

        // Window close button behaves like Esc.
        if ctx.input(|i| i.viewport().close_requested()) && !self.exited {
            self.dispatch(ctx, Intent::Exit);
        }
        if self.exited {
            return;
        }

        let mut intents = Self::keyboard_intents(ctx);
        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::O)) {
            self.open_map_dialog();
        }

        // Floor tabs
        let toolbar_action = egui::TopBottomPanel::top("floor_tabs")
            .exact_height(self.tab_size.y.max(1.0))
            .show(ctx, |ui| toolbar::show(ui, &self.session, self.tab_size.x))
            .inner;

        match toolbar_action {
            toolbar::ToolbarAction::SwitchFloor(index) => intents.push(Intent::SwitchFloor(index)),
            toolbar::ToolbarAction::OpenMap => self.open_map_dialog(),
            toolbar::ToolbarAction::SaveAll => intents.push(Intent::SaveAll),
            toolbar::ToolbarAction::None => {}
        }

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(ref message) = self.loading_message {
                    ui.spinner();
                    ui.label(message);
                } else if let Some(ref message) = self.status {
                    ui.label(message);
                } else if let Some(floor) = self.session.active_floor() {
                    let (width, height) = floor.dimensions();
                    ui.label(format!("{} ({}x{})", floor.name(), width, height));
                } else {
                    ui.label("No map loaded");
                }
            });
        });

        self.refresh_texture(ctx);

        // Map canvas
        let canvas_input = egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                canvas::show(ui, &self.session, self.texture.as_ref().map(|t| &t.handle))
            })
            .inner;

        intents.extend(canvas_input.intents);
        if let Some(pan) = self.take_pan(canvas_input.pan) {
            intents.push(pan);
        }

        if self.session.show_help() {
            help::show(ctx, &self.session, self.session.viewport().ui_offset);
        }

        for intent in intents {
            if matches!(intent, Intent::Stroke { .. } | Intent::Pan { .. } | Intent::Zoom(_)) {
                self.status = None;
            }
            self.dispatch(ctx, intent);
            if self.exited {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::error::PersistenceError;
    use crate::models::fog::BrushOp;

    fn app() -> FogMapApp {
        let config = ViewerConfig::default();
        FogMapApp::new(Session::new(&config, None), &config.window, None)
    }

    #[test]
    fn test_pan_keeps_sub_pixel_remainder() {
        let mut app = app();
        assert_eq!(app.take_pan(egui::vec2(0.4, -0.6)), None);
        assert_eq!(app.take_pan(egui::vec2(0.7, -0.5)), Some(Intent::Pan { dx: 1, dy: -1 }));
        assert!((app.pan_residual.x - 0.1).abs() < 1e-5);
        assert!((app.pan_residual.y + 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_dropped_loader_is_cleared() {
        let mut app = app();
        let (sender, receiver) = channel::<Result<LoadedMap, MediaError>>();
        app.image_loader = Some(receiver);
        app.loading_message = Some("Loading maps/lost.png...".to_string());

        let ctx = egui::Context::default();
        app.poll_loader(&ctx);
        assert!(app.image_loader.is_some());

        drop(sender);
        app.poll_loader(&ctx);
        assert!(app.image_loader.is_none());
        assert!(app.loading_message.is_none());
        assert!(app.status.is_some());
    }

    #[test]
    fn test_stroke_updates_texture_in_place() {
        let mut app = app();
        let image = RgbaImage::from_pixel(64, 48, image::Rgba([200, 180, 160, 255]));
        app.session.add_loaded(Path::new("no/such/dir/hall.png"), image);

        let ctx = egui::Context::default();
        app.refresh_texture(&ctx);
        let first = app.texture.as_ref().unwrap().handle.id();

        app.session.active_floor_mut().unwrap().mask_mut().apply_brush((10, 10), 5, BrushOp::Reveal);
        app.refresh_texture(&ctx);

        let texture = app.texture.as_ref().unwrap();
        assert_eq!(texture.handle.id(), first);
        assert_eq!(texture.revision, app.session.active_floor().unwrap().mask().revision());
        assert_eq!(app.session.active_floor_mut().unwrap().mask_mut().take_dirty(), None);
    }

    #[test]
    fn test_only_discarded_records_are_reported() {
        let path = Path::new("maps/keep.png");
        assert_eq!(describe_restore(path, &Restore::Fresh), None);
        assert_eq!(describe_restore(path, &Restore::Restored { centres: 3 }), None);

        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let discarded = Restore::Discarded(PersistenceError::Parse {
            path: PathBuf::from("maps/keep.map"),
            source: err,
        });
        let message = describe_restore(path, &discarded).unwrap();
        assert!(message.contains("keep.map"));
        assert!(message.ends_with("starting fully fogged"));
    }
}
