//! Sprite images keyed by [`Sprite`]

use std::collections::HashMap;
use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::assets::{AssetError, AssetLoader, SpriteSheet};
use crate::consts::{
    BREAK_INDICATOR_FRAMES, BREAK_INDICATOR_LENGTH, CRYSTAL_FRAMES, FOG_EDGE_HEIGHT, ITEM_LENGTH,
    SCREEN_HEIGHT, SCREEN_WIDTH, TILE_LENGTH,
};
use crate::scene::Sprite;
use crate::sim::{ItemKind, TileKind};

/// Texture paths relative to the asset root
pub mod paths {
    pub const BACKGROUND: &str = "textures/debug_background.png";
    pub const TILE_SHEET: &str = "textures/tiles/tile_sheet.png";
    pub const LOCKED_TILE_SHEET: &str = "textures/tiles/locked_tile_sheet.png";
    pub const CRYSTAL: &str = "textures/tiles/crystal.png";
    pub const MUD_ITEM: &str = "textures/item/mud_item_sheet2.png";
    pub const STONE_ITEM: &str = "textures/item/cobblestone_item_sheet.png";
    pub const SCAFFOLD_ITEM: &str = "textures/item/scaffold_item_sheet.png";
    pub const BREAK_INDICATOR: &str = "textures/break_indicator.png";
    pub const FOG_EDGES: &str = "textures/fog_edges.png";
    pub const HOTBAR: &str = "textures/hotbar.png";
    pub const SELECTION: &str = "textures/selection.png";
}

const ITEM_KINDS: [ItemKind; 3] = [ItemKind::Mud, ItemKind::Stone, ItemKind::Scaffold];

/// Every image the renderer can draw, sliced up front
#[derive(Debug, Clone)]
pub struct SpriteAtlas {
    background: RgbaImage,
    /// Indexed by `TileKind::sheet_column`
    tiles: Vec<RgbaImage>,
    locked_tiles: Vec<RgbaImage>,
    crystal: Vec<RgbaImage>,
    items: HashMap<ItemKind, Vec<RgbaImage>>,
    break_indicator: Vec<RgbaImage>,
    fog_top: RgbaImage,
    fog_bottom: RgbaImage,
    hotbar: RgbaImage,
    selection: RgbaImage,
}

impl SpriteAtlas {
    /// Load and slice every texture; any missing texture is an error
    pub fn load(loader: &impl AssetLoader) -> Result<Self, AssetError> {
        let tile = TILE_LENGTH as u32;
        let item = ITEM_LENGTH as u32;
        let sheet = |path: &str, w: u32, h: u32| -> Result<SpriteSheet, AssetError> {
            SpriteSheet::new(w, h, loader.load_texture(Path::new(path))?)
        };

        let tiles = sheet(paths::TILE_SHEET, tile, tile)?;
        let locked = sheet(paths::LOCKED_TILE_SHEET, tile, tile)?;
        let fog = sheet(paths::FOG_EDGES, SCREEN_WIDTH as u32, FOG_EDGE_HEIGHT as u32)?;

        let mut items = HashMap::new();
        for kind in ITEM_KINDS {
            let path = match kind {
                ItemKind::Mud => paths::MUD_ITEM,
                ItemKind::Stone => paths::STONE_ITEM,
                ItemKind::Scaffold => paths::SCAFFOLD_ITEM,
            };
            items.insert(kind, sheet(path, item, item)?.frames()?);
        }

        let atlas = Self {
            background: loader.load_texture(Path::new(paths::BACKGROUND))?,
            tiles: row_of(&tiles)?,
            locked_tiles: row_of(&locked)?,
            crystal: sheet(paths::CRYSTAL, tile, tile)?.frames()?,
            items,
            break_indicator: sheet(
                paths::BREAK_INDICATOR,
                BREAK_INDICATOR_LENGTH as u32,
                BREAK_INDICATOR_LENGTH as u32,
            )?
            .frames()?,
            fog_top: fog.frame(0, 0)?,
            fog_bottom: fog.frame(0, 1)?,
            hotbar: loader.load_texture(Path::new(paths::HOTBAR))?,
            selection: loader.load_texture(Path::new(paths::SELECTION))?,
        };
        log::info!("Sprite atlas loaded");
        Ok(atlas)
    }

    /// Flat-coloured stand-ins for every sprite, for runs without an asset directory
    pub fn placeholder() -> Self {
        let tile = TILE_LENGTH as u32;
        let item = ITEM_LENGTH as u32;
        let tiles: Vec<RgbaImage> = sheet_ordered_kinds()
            .map(|kind| solid(tile, tile, tile_colour(kind)))
            .collect();
        let locked_tiles = sheet_ordered_kinds()
            .map(|kind| solid(tile, tile, darken(tile_colour(kind))))
            .collect();
        let items = ITEM_KINDS
            .into_iter()
            .map(|kind| (kind, vec![solid(item, item, tile_colour(kind.tile()))]))
            .collect();
        let break_indicator = (0..BREAK_INDICATOR_FRAMES)
            .map(|frame| {
                let shade = 255 - (frame * 24) as u8;
                let len = BREAK_INDICATOR_LENGTH as u32;
                solid(len, len, Rgba([shade, shade, shade, 255]))
            })
            .collect();

        Self {
            background: solid(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32, Rgba([135, 190, 235, 255])),
            tiles,
            locked_tiles,
            crystal: (0..CRYSTAL_FRAMES)
                .map(|frame| solid(tile, tile, Rgba([90, 220, 240 - (frame * 10) as u8, 255])))
                .collect(),
            items,
            break_indicator,
            fog_top: solid(SCREEN_WIDTH as u32, FOG_EDGE_HEIGHT as u32, Rgba([0, 0, 0, 128])),
            fog_bottom: solid(SCREEN_WIDTH as u32, FOG_EDGE_HEIGHT as u32, Rgba([0, 0, 0, 128])),
            hotbar: solid(450, 62, Rgba([60, 60, 60, 220])),
            selection: solid(58, 58, Rgba([255, 255, 255, 96])),
        }
    }

    /// Image for `sprite`; animated sprites wrap their frame index
    pub fn image(&self, sprite: &Sprite) -> Option<&RgbaImage> {
        match *sprite {
            Sprite::Background => Some(&self.background),
            Sprite::Tile { kind, locked } => {
                let sheet = if locked { &self.locked_tiles } else { &self.tiles };
                sheet.get(kind.sheet_column() as usize)
            }
            Sprite::Crystal { frame } => wrapped(&self.crystal, frame),
            Sprite::Item { kind, frame } => self.items.get(&kind).and_then(|f| wrapped(f, frame)),
            Sprite::BreakIndicator { frame } => wrapped(&self.break_indicator, frame),
            Sprite::FogEdge { top: true } => Some(&self.fog_top),
            Sprite::FogEdge { top: false } => Some(&self.fog_bottom),
            Sprite::Hotbar => Some(&self.hotbar),
            Sprite::Selection => Some(&self.selection),
        }
    }
}

fn wrapped(frames: &[RgbaImage], frame: usize) -> Option<&RgbaImage> {
    if frames.is_empty() {
        None
    } else {
        frames.get(frame % frames.len())
    }
}

/// First row of a sheet, one image per column
fn row_of(sheet: &SpriteSheet) -> Result<Vec<RgbaImage>, AssetError> {
    (0..sheet.columns()).map(|col| sheet.frame(col, 0)).collect()
}

/// Tile kinds ordered by their sheet column
fn sheet_ordered_kinds() -> impl Iterator<Item = TileKind> {
    let mut kinds = TileKind::ALL;
    kinds.sort_by_key(|k| k.sheet_column());
    kinds.into_iter()
}

fn solid(width: u32, height: u32, colour: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, colour)
}

fn darken(Rgba([r, g, b, a]): Rgba<u8>) -> Rgba<u8> {
    Rgba([r / 3, g / 3, b / 3, a])
}

fn tile_colour(kind: TileKind) -> Rgba<u8> {
    match kind {
        TileKind::Grass => Rgba([80, 170, 60, 255]),
        TileKind::Dirt => Rgba([130, 90, 50, 255]),
        TileKind::Stone => Rgba([120, 120, 125, 255]),
        TileKind::Log => Rgba([100, 70, 40, 255]),
        TileKind::Scaffold => Rgba([200, 170, 110, 255]),
        TileKind::Crystal => Rgba([90, 220, 240, 255]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serves a fixed-size image for every path
    struct Uniform {
        width: u32,
        height: u32,
    }

    impl AssetLoader for Uniform {
        fn load_texture(&self, _path: &Path) -> Result<RgbaImage, AssetError> {
            Ok(solid(self.width, self.height, Rgba([1, 2, 3, 255])))
        }
    }

    #[test]
    fn test_placeholder_covers_every_sprite() {
        let atlas = SpriteAtlas::placeholder();
        for kind in TileKind::ALL {
            for locked in [false, true] {
                assert!(atlas.image(&Sprite::Tile { kind, locked }).is_some());
            }
        }
        for kind in ITEM_KINDS {
            assert!(atlas.image(&Sprite::Item { kind, frame: 7 }).is_some());
        }
        assert!(atlas.image(&Sprite::Crystal { frame: 99 }).is_some());
        assert!(atlas.image(&Sprite::BreakIndicator { frame: 3 }).is_some());
    }

    #[test]
    fn test_placeholder_tiles_follow_sheet_columns() {
        let atlas = SpriteAtlas::placeholder();
        let stone = atlas
            .image(&Sprite::Tile {
                kind: TileKind::Stone,
                locked: false,
            })
            .unwrap();
        assert_eq!(*stone.get_pixel(0, 0), tile_colour(TileKind::Stone));
    }

    #[test]
    fn test_load_slices_sheets() {
        let loader = Uniform {
            width: 1500,
            height: 300,
        };
        let atlas = SpriteAtlas::load(&loader).unwrap();
        assert_eq!(atlas.tiles.len(), 30);
        assert_eq!(atlas.crystal.len(), 30 * 6);
        assert_eq!(atlas.fog_top.dimensions(), (1500, 150));
    }

    #[test]
    fn test_load_rejects_undersized_sheet() {
        let loader = Uniform {
            width: 20,
            height: 20,
        };
        assert!(matches!(
            SpriteAtlas::load(&loader),
            Err(AssetError::InvalidFrameSize { .. })
        ));
    }
}
