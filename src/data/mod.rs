//! Data layer — populates the species registry at game startup.
//!
//! This plugin runs in OnEnter(GameState::Loading), fills the SpeciesRegistry
//! from the hard-coded game-design data in `species`, then transitions the
//! game into GameState::Playing.
//!
//! Embedding apps that want different crop numbers insert their own
//! `SpeciesRegistry` (e.g. from `species::species_from_ron_str`) before
//! startup; a non-empty registry is left untouched.

pub mod species;

use bevy::prelude::*;
use crate::shared::*;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpeciesRegistry>()
            .add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

fn load_all_data(
    mut species_registry: ResMut<SpeciesRegistry>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if species_registry.species.is_empty() {
        info!("[Data] Populating species registry…");
        species::populate_species(&mut species_registry);
    } else {
        info!("[Data] Species registry supplied by the app — keeping it");
    }
    info!("[Data]   Species loaded: {}", species_registry.species.len());

    next_state.set(GameState::Playing);
}
