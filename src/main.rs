// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! FOGMAP - Fog-of-war map viewer
//!
//! A desktop application for tabletop game masters: a map image is covered
//! by fog that is revealed or re-covered with a soft brush, across several
//! floors, with progress saved next to each map.

mod app;
mod config;
mod error;
mod io;
mod models;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::FogMapApp;
use clap::Parser;
use config::ViewerConfig;
use models::session::Session;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fogmap", version, about = "Fog-of-war map viewer")]
struct Args {
    /// Map image to open; a file picker is shown when omitted
    image: Option<PathBuf>,

    /// YAML settings file (defaults to ./fogmap.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();
    let config = ViewerConfig::load(args.config.as_deref()).context("Failed to load settings")?;

    let Some(path) = args.image.or_else(app::pick_map_file) else {
        println!("No map selected. Nothing to do.");
        return Ok(());
    };

    let fog_texture = config.fog.texture.as_deref().and_then(io::media::load_fog_texture);
    let mut session = Session::new(&config, fog_texture);

    let status = match session.add_floor(&path) {
        Ok(added) => app::describe_restore(&path, &added.restore),
        Err(e) => {
            log::error!("{}", e);
            println!("Failed to load map: {}. Nothing to do.", e);
            return Ok(());
        }
    };

    // Configure egui options
    let window = &config.window;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([window.width, window.height])
            .with_min_inner_size([320.0, 240.0])
            .with_title("Fog Map Viewer"),
        ..Default::default()
    };

    // Run the application
    let app = FogMapApp::new(session, window, status);
    eframe::run_native(
        "fogmap",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    log::info!("Exited");
    Ok(())
}
