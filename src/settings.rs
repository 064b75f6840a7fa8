//! World settings
//!
//! Loaded from a JSON file when one is given, otherwise the defaults reproduce
//! the stock starting world.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::ItemKind;

/// Errors from loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// A starting hotbar stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingStack {
    pub item: ItemKind,
    pub amount: u32,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run seed for item scatter
    pub seed: u64,

    // === World layout ===
    /// Global tile coordinate of the grid's top-left cell
    pub grid_origin: (i32, i32),
    /// Starting global row of the crystal (ground level is 0, up is negative)
    pub crystal_height: i32,
    /// Global row of the grass layer
    pub grass_row: i32,
    /// Last global row of dirt; stone fills everything below
    pub dirt_bottom_row: i32,
    /// Global column of the starting scaffold pillar, if any
    pub scaffold_column: Option<i32>,
    /// Height of the scaffold pillar in tiles
    pub scaffold_height: u32,
    /// Global column of a log pillar standing on the grass, if any
    pub log_column: Option<i32>,
    pub log_height: u32,

    // === Player ===
    /// Hotbar contents at session start, left to right
    pub starting_hotbar: Vec<StartingStack>,

    // === Items ===
    /// Launch speed (pixels per tick) of freshly dropped items
    pub item_launch_speed: i32,
    /// Ticks per frame of the item spin animation
    pub item_frame_ticks: f64,
    /// Ticks per frame of the crystal shimmer animation
    pub crystal_frame_ticks: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0,

            grid_origin: (-14, -10),
            crystal_height: -5,
            grass_row: 1,
            dirt_bottom_row: 5,
            scaffold_column: Some(3),
            scaffold_height: 5,
            log_column: None,
            log_height: 4,

            starting_hotbar: vec![
                StartingStack {
                    item: ItemKind::Mud,
                    amount: 100,
                },
                StartingStack {
                    item: ItemKind::Stone,
                    amount: 100,
                },
                StartingStack {
                    item: ItemKind::Scaffold,
                    amount: 100,
                },
            ],

            item_launch_speed: 15,
            item_frame_ticks: 5.0,
            crystal_frame_ticks: 2.0,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load from `path` if given, otherwise use the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.crystal_height > 0 {
            return Err(SettingsError::Invalid(format!(
                "crystal_height must be at or above ground level, got {}",
                self.crystal_height
            )));
        }
        if self.dirt_bottom_row < self.grass_row {
            return Err(SettingsError::Invalid(format!(
                "dirt_bottom_row {} is above grass_row {}",
                self.dirt_bottom_row, self.grass_row
            )));
        }
        if self.starting_hotbar.len() > crate::consts::HOTBAR_SLOTS {
            return Err(SettingsError::Invalid(format!(
                "starting_hotbar has {} stacks, the hotbar holds {}",
                self.starting_hotbar.len(),
                crate::consts::HOTBAR_SLOTS
            )));
        }
        if self.item_frame_ticks <= 0.0 || self.crystal_frame_ticks <= 0.0 {
            return Err(SettingsError::Invalid(
                "animation frame ticks must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
