//! Software render surface
//!
//! Composites draw commands onto an in-memory RGBA frame the size of the
//! screen. Sprites are alpha-blended; fills are opaque black.

use std::path::Path;

use image::{Rgba, RgbaImage};

use super::atlas::SpriteAtlas;
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::scene::{Bound, DrawCommand, RenderSurface};

pub struct Canvas<'a> {
    frame: RgbaImage,
    atlas: &'a SpriteAtlas,
    /// Commands drawn since the last clear
    drawn: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(atlas: &'a SpriteAtlas) -> Self {
        Self {
            frame: RgbaImage::new(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32),
            atlas,
            drawn: 0,
        }
    }

    /// Reset to transparent black
    pub fn clear(&mut self) {
        self.frame.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
        self.drawn = 0;
    }

    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    pub fn drawn(&self) -> usize {
        self.drawn
    }

    pub fn save_png(&self, path: &Path) -> image::ImageResult<()> {
        self.frame.save(path)?;
        log::info!("Saved frame to {}", path.display());
        Ok(())
    }

    fn fill(&mut self, bound: &Bound) {
        let max_x = bound.max.x.min(SCREEN_WIDTH - 1);
        let max_y = bound.max.y.min(SCREEN_HEIGHT - 1);
        for y in bound.min.y.max(0)..=max_y {
            for x in bound.min.x.max(0)..=max_x {
                self.frame.put_pixel(x as u32, y as u32, Rgba([0, 0, 0, 255]));
            }
        }
    }
}

impl RenderSurface for Canvas<'_> {
    fn draw(&mut self, command: &DrawCommand) {
        let atlas = self.atlas;
        match command {
            DrawCommand::Sprite { sprite, pos } => match atlas.image(sprite) {
                Some(img) => image::imageops::overlay(&mut self.frame, img, pos.x as i64, pos.y as i64),
                None => {
                    log::trace!("No image for {:?}", sprite);
                    return;
                }
            },
            DrawCommand::Fill { bound } => self.fill(bound),
        }
        self.drawn += 1;
    }
}
