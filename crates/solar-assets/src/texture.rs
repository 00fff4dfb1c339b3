//! Texture decoding to RGBA8 with a checkerboard fallback.

use std::path::Path;

use crate::error::AssetError;

pub const CHECKER_LIGHT: u8 = 255;
pub const CHECKER_DARK: u8 = 80;
const CHECKER_SIZE: u32 = 4;

/// Decoded RGBA8 pixels, row-major, top row first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    /// One opaque texel of `rgb`.
    pub fn solid(rgb: [u8; 3]) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![rgb[0], rgb[1], rgb[2], 255],
        }
    }
}

/// 4×4 grey checkerboard, light at texel (0, 0).
pub fn checkerboard() -> TextureImage {
    let mut rgba = Vec::with_capacity((CHECKER_SIZE * CHECKER_SIZE * 4) as usize);
    for y in 0..CHECKER_SIZE {
        for x in 0..CHECKER_SIZE {
            let v = if (x + y) % 2 == 0 {
                CHECKER_LIGHT
            } else {
                CHECKER_DARK
            };
            rgba.extend_from_slice(&[v, v, v, 255]);
        }
    }
    TextureImage {
        width: CHECKER_SIZE,
        height: CHECKER_SIZE,
        rgba,
    }
}

pub fn load_texture(path: &Path) -> Result<TextureImage, AssetError> {
    let image = image::open(path)
        .map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(TextureImage {
        width,
        height,
        rgba: image.into_raw(),
    })
}

/// Decode `path`, or log why not and return [`checkerboard`].
pub fn load_texture_or_checkerboard(path: &Path) -> TextureImage {
    match load_texture(path) {
        Ok(texture) => {
            log::info!(
                "Loaded texture {} ({}x{})",
                path.display(),
                texture.width,
                texture.height
            );
            texture
        }
        Err(e) => {
            log::warn!("{e}; using checkerboard");
            checkerboard()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkerboard_pattern() {
        let board = checkerboard();
        assert_eq!((board.width, board.height), (4, 4));
        assert_eq!(board.rgba.len(), 64);
        let texel = |x: usize, y: usize| board.rgba[(y * 4 + x) * 4];
        assert_eq!(texel(0, 0), 255);
        assert_eq!(texel(1, 0), 80);
        assert_eq!(texel(0, 1), 80);
        assert_eq!(texel(3, 3), 255);
        assert!(board.rgba.chunks_exact(4).all(|p| p[3] == 255 && p[0] == p[1] && p[1] == p[2]));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let texture = load_texture_or_checkerboard(&dir.path().join("earth.jpg"));
        assert_eq!(texture, checkerboard());
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mars.jpg");
        std::fs::write(&path, b"definitely not a jpeg").expect("write");
        assert!(matches!(load_texture(&path), Err(AssetError::Image { .. })));
        assert_eq!(load_texture_or_checkerboard(&path), checkerboard());
    }

    #[test]
    fn test_png_decodes_to_rgba() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tiny.png");
        let img = image::RgbImage::from_fn(3, 2, |x, y| image::Rgb([x as u8 * 10, y as u8 * 20, 7]));
        img.save(&path).expect("save png");

        let texture = load_texture(&path).expect("decode");
        assert_eq!((texture.width, texture.height), (3, 2));
        assert_eq!(texture.rgba.len(), 3 * 2 * 4);
        // Row 1, column 2.
        let i = (3 + 2) * 4;
        assert_eq!(&texture.rgba[i..i + 4], &[20, 20, 7, 255]);
    }

    #[test]
    fn test_solid_texel() {
        let white = TextureImage::solid([255, 255, 255]);
        assert_eq!(white.rgba, vec![255; 4]);
    }
}
