// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Map image and fog texture loading.
//!
//! Images are decoded with the `image` crate and converted to RGBA8 so the
//! rest of the viewer only deals with one pixel layout.

use crate::error::MediaError;
use crate::models::fog::FogTexture;
use image::RgbaImage;
use std::path::Path;

/// File extensions offered by the open dialog.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Load an image file as RGBA8.
pub fn load_image(path: &Path) -> Result<RgbaImage, MediaError> {
    let image = image::open(path).map_err(|source| MediaError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

/// Load a tileable fog texture. `None` if the file is missing, unreadable
/// or empty; the caller falls back to solid fog.
pub fn load_fog_texture(path: &Path) -> Option<FogTexture> {
    if !path.exists() {
        log::info!("No fog texture at {}, using solid fog", path.display());
        return None;
    }
    match load_image(path) {
        Ok(image) => {
            let texture = FogTexture::from_rgba(&image);
            match &texture {
                Some(t) => log::info!("Loaded fog texture {} ({}x{})", path.display(), t.dimensions().0, t.dimensions().1),
                None => log::warn!("Fog texture {} is empty, using solid fog", path.display()),
            }
            texture
        }
        Err(e) => {
            log::warn!("{}; using solid fog", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    #[test]
    fn test_load_png_as_rgba() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255])).save(&path).unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [1, 2, 3, 255]);
    }

    #[test]
    fn test_unreadable_image_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("not-an-image.png");
        std::fs::write(&path, b"definitely not png").unwrap();

        let err = load_image(&path).unwrap_err();
        assert_eq!(err.path, path);
        assert!(load_image(&dir.path().join("absent.png")).is_err());
    }

    #[test]
    fn test_fog_texture_fallbacks() {
        let dir = tempdir().unwrap();
        assert!(load_fog_texture(&dir.path().join("cloud_fog.png")).is_none());

        let path = dir.path().join("cloud_fog.png");
        RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 128])).save(&path).unwrap();
        let texture = load_fog_texture(&path).unwrap();
        assert_eq!(texture.dimensions(), (8, 8));
    }
}
