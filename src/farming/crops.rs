//! Planting and day-by-day crop growth.

use bevy::prelude::*;
use std::collections::HashMap;
use crate::shared::*;
use super::harvest::HarvestHitbox;
use super::soil::SoilGrid;

/// Draw layer for a plant sprite. Seedlings sit flat on the soil; anything
/// taller is depth-sorted with the rest of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlantLayer {
    Ground,
    Main,
}

/// One growing crop. Lives in [`PlantRegistry`] under the cell it was
/// planted in; `cell` is only ever used to look the tile up, never to change it.
#[derive(Debug, Clone, PartialEq)]
pub struct Plant {
    pub species: Species,
    pub cell: CellIndex,
    age: f32,
    max_age: f32,
    growth_rate: f32,
    /// Watered days grown so far.
    days_grown: u32,
    /// `ceil(max_age / growth_rate)`; zero for a species with a single frame.
    days_to_ripen: u32,
    harvestable: bool,
    /// Mid-bottom of the owning tile.
    anchor: Vec2,
    y_offset: f32,
    frame_size: Vec2,
    hitbox_shrink: Vec2,
    harvest_hitbox: Option<HarvestHitbox>,
}

impl Plant {
    pub fn new(species: Species, def: &SpeciesDef, cell: CellIndex, tile: Rect) -> Self {
        let max_age = def.max_age();
        let days_to_ripen = if max_age <= 0.0 {
            0
        } else if def.growth_rate > 0.0 {
            (max_age / def.growth_rate).ceil() as u32
        } else {
            u32::MAX
        };

        let mut plant = Self {
            species,
            cell,
            age: 0.0,
            max_age,
            growth_rate: def.growth_rate,
            days_grown: 0,
            days_to_ripen,
            harvestable: false,
            anchor: Vec2::new(tile.center().x, tile.max.y),
            y_offset: def.y_offset,
            frame_size: Vec2::from(def.frame_size),
            hitbox_shrink: Vec2::from(def.hitbox_shrink),
            harvest_hitbox: None,
        };
        if days_to_ripen == 0 {
            plant.ripen();
        }
        plant
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn max_age(&self) -> f32 {
        self.max_age
    }

    pub fn growth_rate(&self) -> f32 {
        self.growth_rate
    }

    pub fn is_harvestable(&self) -> bool {
        self.harvestable
    }

    /// Sprite frame to draw.
    pub fn frame(&self) -> usize {
        self.age.floor() as usize
    }

    pub fn layer(&self) -> PlantLayer {
        if self.frame() > 0 {
            PlantLayer::Main
        } else {
            PlantLayer::Ground
        }
    }

    /// Sprite rectangle: mid-bottom pinned to the tile's mid-bottom, shifted
    /// by the species offset.
    pub fn sprite_rect(&self) -> Rect {
        let mid_bottom = self.anchor + Vec2::new(0.0, self.y_offset);
        let min = Vec2::new(
            mid_bottom.x - self.frame_size.x / 2.0,
            mid_bottom.y - self.frame_size.y,
        );
        Rect::from_corners(min, min + self.frame_size)
    }

    /// Pick-up region. Only present once the plant is ripe.
    pub fn harvest_hitbox(&self) -> Option<&HarvestHitbox> {
        self.harvest_hitbox.as_ref()
    }

    /// Grow one watered day. Returns true on the day the plant ripens.
    pub fn grow(&mut self) -> bool {
        if self.harvestable {
            return false;
        }

        self.days_grown = self.days_grown.saturating_add(1);
        self.age = (self.age + self.growth_rate).min(self.max_age);
        if self.days_grown < self.days_to_ripen {
            return false;
        }

        self.ripen();
        true
    }

    /// Ripeness is decided by the day count, so float drift in `age` can
    /// neither hurry nor delay it.
    fn ripen(&mut self) {
        self.age = self.max_age;
        self.harvestable = true;
        self.harvest_hitbox = Some(HarvestHitbox::shrunk(self.sprite_rect(), self.hitbox_shrink));
    }
}

/// Every live plant, keyed by the cell it grows in. A key is present exactly
/// when that cell carries the Planted flag.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlantRegistry {
    plants: HashMap<CellIndex, Plant>,
}

impl PlantRegistry {
    pub fn get(&self, cell: CellIndex) -> Option<&Plant> {
        self.plants.get(&cell)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plant> {
        self.plants.values()
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    pub(crate) fn create(
        &mut self,
        species: Species,
        def: &SpeciesDef,
        cell: CellIndex,
        tile: Rect,
    ) -> &Plant {
        self.plants
            .entry(cell)
            .or_insert_with(|| Plant::new(species, def, cell, tile))
    }

    pub(crate) fn remove(&mut self, cell: CellIndex) -> Option<Plant> {
        self.plants.remove(&cell)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Planting
// ─────────────────────────────────────────────────────────────────────────────

/// Put a seed of `species` into the tile under `point`. Succeeds only on
/// tilled, empty soil; the caller deducts a seed only when this returns true.
pub fn plant_seed(
    grid: &mut SoilGrid,
    plants: &mut PlantRegistry,
    species_registry: &SpeciesRegistry,
    point: Vec2,
    species: Species,
) -> bool {
    let Some(cell) = grid.cell_at(point) else {
        return false;
    };
    let Some(def) = species_registry.get(species) else {
        warn!("[Farming] No species data for {:?} — cannot plant", species);
        return false;
    };
    if !grid.set_planted(cell) {
        return false;
    }

    debug_assert!(plants.get(cell).is_none(), "plant record without Planted flag at {:?}", cell);
    let tile = grid.cell_rect(cell);
    plants.create(species, def, cell, tile);
    true
}

pub fn handle_plant_seed(
    mut plant_events: EventReader<PlantSeedEvent>,
    mut grid: ResMut<SoilGrid>,
    mut plants: ResMut<PlantRegistry>,
    species_registry: Res<SpeciesRegistry>,
    mut planted_events: EventWriter<CropPlantedEvent>,
    mut sfx_events: EventWriter<PlaySfxEvent>,
) {
    for event in plant_events.read() {
        if !plant_seed(&mut grid, &mut plants, &species_registry, event.target, event.species) {
            continue;
        }
        let Some(cell) = grid.cell_at(event.target) else {
            continue;
        };

        debug!("[Farming] Planted {} at ({}, {})", event.species.id(), cell.row, cell.col);
        planted_events.send(CropPlantedEvent { cell, species: event.species });
        sfx_events.send(PlaySfxEvent { sfx_id: "plant".to_string() });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Growth (called from events_handler::run_day_cycle)
// ─────────────────────────────────────────────────────────────────────────────

/// Grow every plant standing in watered soil by one day. Dry plants wait; a
/// missed day is never made up later. Returns the cells that ripened today.
pub fn advance_all(plants: &mut PlantRegistry, grid: &SoilGrid) -> Vec<CellIndex> {
    let mut ripened = Vec::new();

    for plant in plants.plants.values_mut() {
        if !grid.is_watered_cell(plant.cell) {
            continue;
        }
        if plant.grow() {
            ripened.push(plant.cell);
        }
    }

    ripened
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
