//! Harvest — ripe plants are picked up when the player walks into them.

use bevy::prelude::*;
use crate::shared::*;
use super::crops::{Plant, PlantRegistry};
use super::soil::SoilGrid;

/// Pick-up region of a ripe plant: its sprite shrunk about the centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarvestHitbox {
    pub rect: Rect,
}

impl HarvestHitbox {
    /// `shrink.x` is taken off the width in pixels, `shrink.y` is the fraction
    /// of the height taken off.
    pub fn shrunk(sprite: Rect, shrink: Vec2) -> Self {
        let size = sprite.size();
        let new_size = Vec2::new(size.x - shrink.x, size.y - size.y * shrink.y).max(Vec2::ZERO);
        Self { rect: Rect::from_center_size(sprite.center(), new_size) }
    }
}

impl Collidable for HarvestHitbox {
    fn hitbox(&self) -> Rect {
        self.rect
    }
}

/// Attached by the interaction layer to whatever collects crops (the player).
/// Keep `hitbox` in world space, updated every frame.
#[derive(Component, Debug, Clone, Copy)]
pub struct Harvester {
    pub hitbox: Rect,
}

impl Collidable for Harvester {
    fn hitbox(&self) -> Rect {
        self.hitbox
    }
}

/// The ripe plant in the tile under `point`, if there is one.
pub fn harvestable_at<'a>(
    grid: &SoilGrid,
    plants: &'a PlantRegistry,
    point: Vec2,
) -> Option<&'a Plant> {
    let cell = grid.cell_at(point)?;
    plants.get(cell).filter(|plant| plant.is_harvestable())
}

/// Take the plant out of `cell`: drops the record and clears the Planted flag
/// together. Returns the removed plant.
///
/// This is the bare state change; the systems below wrap it so every harvest
/// raises [`CropHarvestedEvent`].
pub fn remove_plant(
    grid: &mut SoilGrid,
    plants: &mut PlantRegistry,
    cell: CellIndex,
) -> Option<Plant> {
    let plant = plants.remove(cell)?;

    let cleared = grid.clear_planted(cell);
    if !cleared {
        error!(
            "[Farming] Plant at ({}, {}) had no Planted flag — grid and registry out of sync",
            cell.row, cell.col
        );
    }
    debug_assert!(cleared, "plant/Planted desync at {:?}", cell);

    Some(plant)
}

fn pick_up(
    grid: &mut SoilGrid,
    plants: &mut PlantRegistry,
    cell: CellIndex,
    harvested_events: &mut EventWriter<CropHarvestedEvent>,
    sfx_events: &mut EventWriter<PlaySfxEvent>,
) {
    let Some(plant) = remove_plant(grid, plants, cell) else {
        return;
    };
    info!("[Farming] Harvested {} at ({}, {})", plant.species.id(), cell.row, cell.col);
    harvested_events.send(CropHarvestedEvent { cell, species: plant.species });
    sfx_events.send(PlaySfxEvent { sfx_id: "success".to_string() });
}

// ─────────────────────────────────────────────────────────────────────────────
// Explicit harvest
// ─────────────────────────────────────────────────────────────────────────────

/// Pick the ripe crop under each requested point. Unripe or empty tiles are
/// left alone.
pub fn handle_harvest_request(
    mut harvest_events: EventReader<HarvestRequestEvent>,
    mut grid: ResMut<SoilGrid>,
    mut plants: ResMut<PlantRegistry>,
    mut harvested_events: EventWriter<CropHarvestedEvent>,
    mut sfx_events: EventWriter<PlaySfxEvent>,
) {
    for event in harvest_events.read() {
        let Some(cell) = harvestable_at(&grid, &plants, event.target).map(|plant| plant.cell) else {
            continue;
        };
        pick_up(&mut grid, &mut plants, cell, &mut harvested_events, &mut sfx_events);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Collision pass
// ─────────────────────────────────────────────────────────────────────────────

/// Remove every ripe plant touching a [`Harvester`]. Runs as its own pass,
/// after growth, so the plant map is never changed while it is being walked.
pub fn collect_ripe_crops(
    harvesters: Query<&Harvester>,
    mut grid: ResMut<SoilGrid>,
    mut plants: ResMut<PlantRegistry>,
    mut harvested_events: EventWriter<CropHarvestedEvent>,
    mut sfx_events: EventWriter<PlaySfxEvent>,
) {
    if harvesters.is_empty() || plants.is_empty() {
        return;
    }

    let picked: Vec<CellIndex> = plants
        .iter()
        .filter_map(|plant| plant.harvest_hitbox().map(|hitbox| (plant.cell, hitbox)))
        .filter(|(_, hitbox)| harvesters.iter().any(|h| h.collides_with(*hitbox)))
        .map(|(cell, _)| cell)
        .collect();

    for cell in picked {
        pick_up(&mut grid, &mut plants, cell, &mut harvested_events, &mut sfx_events);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
