//! Texture loading and sprite sheet slicing

use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load texture {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("frame ({col}, {row}) is outside a {columns}x{rows} sheet")]
    FrameOutOfRange {
        col: u32,
        row: u32,
        columns: u32,
        rows: u32,
    },
    #[error("frame size {width}x{height} does not fit a {image_width}x{image_height} sheet")]
    InvalidFrameSize {
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },
}

/// Source of texture images
pub trait AssetLoader {
    fn load_texture(&self, path: &Path) -> Result<RgbaImage, AssetError>;
}

/// Loads textures from files under a root directory
#[derive(Debug, Clone)]
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader for FsAssetLoader {
    fn load_texture(&self, path: &Path) -> Result<RgbaImage, AssetError> {
        let full = self.root.join(path);
        let img = image::open(&full).map_err(|source| AssetError::Load {
            path: full.clone(),
            source,
        })?;
        log::debug!("Loaded texture {}", full.display());
        Ok(img.to_rgba8())
    }
}

/// A grid of equally sized frames cut from one image
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    frame_width: u32,
    frame_height: u32,
    columns: u32,
    rows: u32,
    image: RgbaImage,
}

impl SpriteSheet {
    pub fn new(frame_width: u32, frame_height: u32, image: RgbaImage) -> Result<Self, AssetError> {
        let (image_width, image_height) = image.dimensions();
        if frame_width == 0
            || frame_height == 0
            || frame_width > image_width
            || frame_height > image_height
        {
            return Err(AssetError::InvalidFrameSize {
                width: frame_width,
                height: frame_height,
                image_width,
                image_height,
            });
        }
        Ok(Self {
            frame_width,
            frame_height,
            columns: image_width / frame_width,
            rows: image_height / frame_height,
            image,
        })
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Total frames, read left to right then top to bottom
    pub fn frame_count(&self) -> u32 {
        self.columns * self.rows
    }

    /// Copy of the frame at (`col`, `row`)
    pub fn frame(&self, col: u32, row: u32) -> Result<RgbaImage, AssetError> {
        if col >= self.columns || row >= self.rows {
            return Err(AssetError::FrameOutOfRange {
                col,
                row,
                columns: self.columns,
                rows: self.rows,
            });
        }
        let view = image::imageops::crop_imm(
            &self.image,
            col * self.frame_width,
            row * self.frame_height,
            self.frame_width,
            self.frame_height,
        );
        Ok(view.to_image())
    }

    /// Every frame in reading order
    pub fn frames(&self) -> Result<Vec<RgbaImage>, AssetError> {
        let mut frames = Vec::with_capacity(self.frame_count() as usize);
        for row in 0..self.rows {
            for col in 0..self.columns {
                frames.push(self.frame(col, row)?);
            }
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// 4x2 frames of 10px, each filled with its own red channel value
    fn numbered_sheet() -> RgbaImage {
        RgbaImage::from_fn(40, 20, |x, y| {
            let index = (y / 10) * 4 + x / 10;
            Rgba([index as u8, 0, 0, 255])
        })
    }

    #[test]
    fn test_frames_are_cut_in_reading_order() {
        let sheet = SpriteSheet::new(10, 10, numbered_sheet()).unwrap();
        assert_eq!(sheet.columns(), 4);
        assert_eq!(sheet.rows(), 2);
        let frame = sheet.frame(1, 1).unwrap();
        assert_eq!(frame.dimensions(), (10, 10));
        assert_eq!(frame.get_pixel(9, 9)[0], 5);

        let all = sheet.frames().unwrap();
        let firsts: Vec<u8> = all.iter().map(|f| f.get_pixel(0, 0)[0]).collect();
        assert_eq!(firsts, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_frame_past_sheet_edge_is_rejected() {
        let sheet = SpriteSheet::new(10, 10, numbered_sheet()).unwrap();
        assert!(matches!(
            sheet.frame(4, 0),
            Err(AssetError::FrameOutOfRange { col: 4, .. })
        ));
        assert!(sheet.frame(0, 2).is_err());
    }

    #[test]
    fn test_oversized_frame_is_rejected() {
        let err = SpriteSheet::new(50, 10, numbered_sheet()).unwrap_err();
        assert!(matches!(err, AssetError::InvalidFrameSize { width: 50, .. }));
        assert!(SpriteSheet::new(0, 10, numbered_sheet()).is_err());
    }

    #[test]
    fn test_missing_texture_is_load_error() {
        let loader = FsAssetLoader::new("/nonexistent/torre-assets");
        let err = loader.load_texture(Path::new("tiles/tile_sheet.png")).unwrap_err();
        assert!(matches!(err, AssetError::Load { .. }));
    }
}
