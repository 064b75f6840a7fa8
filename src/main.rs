//! Torre headless runner
//!
//! Runs the simulation for a fixed number of ticks under a scripted player,
//! logs what happens, and can save the final frame as a PNG.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use glam::IVec2;

use torre::assets::FsAssetLoader;
use torre::consts::{SIM_DT, TICK_RATE, TILE_LENGTH};
use torre::renderer::{Canvas, SpriteAtlas};
use torre::sim::{TickInput, World, WorldEvent, tick};
use torre::{Settings, logging};

/// Crystal tower sandbox, headless
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    /// Override the settings seed
    #[arg(long)]
    seed: Option<u64>,

    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Texture directory; flat placeholder sprites are used when absent
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Write the final frame to this PNG
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Ticks between tower growth clicks
const GROW_INTERVAL: u64 = 90;
/// Tick the scripted dig starts on
const DIG_START: u64 = 240;
/// Ticks the dig button is held
const DIG_HOLD: u64 = 90;

/// Pixel centre of a global tile
fn centre_of(world: &World, global: IVec2) -> IVec2 {
    world.grid.local_to_pixel(global - world.grid.origin()) + IVec2::splat(TILE_LENGTH / 2)
}

/// Scripted player: grow the tower on a fixed beat and dig one patch of ground
fn scripted_input(world: &World, t: u64) -> TickInput {
    let dig_end = DIG_START + DIG_HOLD;
    if (DIG_START..dig_end).contains(&t) {
        return TickInput {
            cursor: Some(centre_of(world, IVec2::new(6, 1))),
            left_pressed: t == DIG_START,
            ..Default::default()
        };
    }
    if t == dig_end {
        return TickInput {
            cursor: Some(centre_of(world, IVec2::new(6, 1))),
            left_released: true,
            ..Default::default()
        };
    }
    TickInput {
        cursor: Some(centre_of(world, world.grid.crystal_position())),
        right_clicked: t % GROW_INTERVAL == 0,
        ..Default::default()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut settings = Settings::load_or_default(args.settings.as_deref())?;
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    let atlas = match &args.assets {
        Some(dir) => SpriteAtlas::load(&FsAssetLoader::new(dir))?,
        None => SpriteAtlas::placeholder(),
    };
    let mut world = World::new(&settings)?;
    log::info!(
        "Running {} ticks ({:.1}s at {} Hz)",
        args.ticks,
        args.ticks as f32 * SIM_DT,
        TICK_RATE
    );

    let mut collapses = 0;
    for t in 0..args.ticks {
        let input = scripted_input(&world, t);
        for event in tick(&mut world, &input) {
            match event {
                WorldEvent::TileCollapsed { global, kind } => {
                    collapses += 1;
                    log::info!("{:?} collapsed at ({}, {})", kind, global.x, global.y);
                }
                WorldEvent::CrystalFell { height } => log::info!("Crystal fell to {}", height),
                other => log::debug!("{:?}", other),
            }
        }
    }

    log::info!(
        "Finished after {} ticks: {} tiles, {} items loose, {} collapses, crystal at {}",
        world.time_ticks,
        world.grid.tile_count(),
        world.items.len(),
        collapses,
        world.grid.crystal_height()
    );
    for (slot, stack) in world.hotbar.slots().iter().enumerate() {
        if let Some(stack) = stack {
            log::info!("Slot {}: {} x {:?}", slot, stack.amount, stack.item);
        }
    }

    if let Some(path) = &args.snapshot {
        let mut canvas = Canvas::new(&atlas);
        world.render(&mut canvas);
        log::debug!("Frame drew {} commands", canvas.drawn());
        canvas.save_png(path)?;
    }

    Ok(())
}
