//! Shared components, resources, events, and states for Farmstead.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    /// Trade menu open; the world is frozen underneath it.
    Shop,
}

// ═══════════════════════════════════════════════════════════════════════
// CALENDAR
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    pub day: u32,
    /// Weather of the current day. Rerolled once per day boundary.
    pub raining: bool,
}

impl Default for Calendar {
    fn default() -> Self {
        Self { day: 1, raining: false }
    }
}

impl Calendar {
    /// Roll a fresh day's weather: uniform in `0..=RAIN_ROLL_MAX`, rain above
    /// the threshold.
    pub fn roll_rain(rng: &mut impl Rng) -> bool {
        rng.gen_range(0..=RAIN_ROLL_MAX) > RAIN_ROLL_THRESHOLD
    }

    /// Advance to the next day and reroll its weather. Returns whether it rains.
    pub fn start_next_day(&mut self, rng: &mut impl Rng) -> bool {
        self.day += 1;
        self.raining = Self::roll_rain(rng);
        self.raining
    }
}

/// Random source for the daily weather roll. Seed it for reproducible runs.
#[derive(Resource, Debug)]
pub struct WeatherRng(pub StdRng);

impl Default for WeatherRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl WeatherRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// GRID
// ═══════════════════════════════════════════════════════════════════════

/// A tile address in the soil grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex {
    pub row: usize,
    pub col: usize,
}

impl CellIndex {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Per-cell state packed into a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellFlags(u8);

impl CellFlags {
    /// Fixed at grid construction from map data.
    pub const FARMABLE: CellFlags = CellFlags(1 << 0);
    pub const TILLED: CellFlags = CellFlags(1 << 1);
    pub const WATERED: CellFlags = CellFlags(1 << 2);
    pub const PLANTED: CellFlags = CellFlags(1 << 3);

    pub const fn empty() -> Self {
        CellFlags(0)
    }

    #[inline]
    pub const fn contains(self, other: CellFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: CellFlags) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: CellFlags) {
        self.0 &= !other.0;
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Pre-parsed map data the soil grid is built from.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FarmLayout {
    pub rows: usize,
    pub cols: usize,
    pub tile_size: f32,
    pub farmable: Vec<CellIndex>,
}

impl FarmLayout {
    /// Grid dimensions come from the ground image, floor-divided by tile size.
    pub fn from_ground_size(
        width_px: u32,
        height_px: u32,
        tile_size: f32,
        farmable: Vec<CellIndex>,
    ) -> Self {
        let (cols, rows) = if tile_size > 0.0 {
            (
                (width_px as f32 / tile_size).floor() as usize,
                (height_px as f32 / tile_size).floor() as usize,
            )
        } else {
            (0, 0)
        };
        Self { rows, cols, tile_size, farmable }
    }

    pub fn from_ron_str(source: &str) -> Result<Self, String> {
        ron::from_str(source).map_err(|e| format!("Farm layout parse failed: {}", e))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SPECIES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Corn,
    Tomato,
}

impl Species {
    pub fn id(self) -> &'static str {
        match self {
            Species::Corn => "corn",
            Species::Tomato => "tomato",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesDef {
    /// Number of sprite frames; max age is `frame_count - 1`.
    pub frame_count: u32,
    /// Age gained per watered day.
    pub growth_rate: f32,
    /// Vertical sprite anchor offset from the tile's mid-bottom (y-down).
    pub y_offset: f32,
    /// Sprite frame size in pixels.
    pub frame_size: [f32; 2],
    /// Harvest region shrink: `[pixels off the width, fraction off the height]`.
    pub hitbox_shrink: [f32; 2],
}

impl SpeciesDef {
    pub fn max_age(&self) -> f32 {
        self.frame_count.saturating_sub(1) as f32
    }
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesRegistry {
    pub species: HashMap<Species, SpeciesDef>,
}

impl SpeciesRegistry {
    pub fn get(&self, species: Species) -> Option<&SpeciesDef> {
        self.species.get(&species)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COLLISION
// ═══════════════════════════════════════════════════════════════════════

/// Anything that takes part in overlap checks. Edges that only touch do not
/// count as a collision.
pub trait Collidable {
    fn hitbox(&self) -> Rect;

    fn collides_with(&self, other: &impl Collidable) -> bool {
        !self.hitbox().intersect(other.hitbox()).is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Hoe,
    WateringCan,
}

/// Sent by the player-control layer when a tool is swung at a world point.
#[derive(Event, Debug, Clone)]
pub struct ToolUseEvent {
    pub tool: ToolKind,
    pub target: Vec2,
}

/// Sent by the player-control layer when a seed is used at a world point.
#[derive(Event, Debug, Clone)]
pub struct PlantSeedEvent {
    pub target: Vec2,
    pub species: Species,
}

/// Sent by the interaction layer to pick the ripe crop under a world point.
#[derive(Event, Debug, Clone)]
pub struct HarvestRequestEvent {
    pub target: Vec2,
}

/// Day boundary (the player slept). Drives the whole day-cycle chain.
#[derive(Event, Debug, Clone)]
pub struct DayEndEvent;

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SoilTilledEvent {
    pub cell: CellIndex,
}

/// A cell became watered; presentation spawns the water overlay.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SoilWateredEvent {
    pub cell: CellIndex,
}

/// Inventory deducts one seed on this event.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct CropPlantedEvent {
    pub cell: CellIndex,
    pub species: Species,
}

/// Inventory credits one item on this event.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct CropHarvestedEvent {
    pub cell: CellIndex,
    pub species: Species,
}

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct NewDayEvent {
    pub day: u32,
    pub raining: bool,
}

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct PlaySfxEvent {
    pub sfx_id: String,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TILE_SIZE: f32 = 64.0;

/// Weather roll is uniform in `0..=RAIN_ROLL_MAX`; rain above the threshold.
pub const RAIN_ROLL_MAX: u32 = 10;
pub const RAIN_ROLL_THRESHOLD: u32 = 7;
