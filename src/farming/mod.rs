//! Farming domain — soil tilling, watering, planting, crop growth, harvest.
//!
//! Communicates with other domains exclusively through crate::shared events/resources.
//! Expects `CalendarPlugin` for the weather and day counter.

use bevy::prelude::*;
use crate::shared::*;

pub mod autotile;
pub mod soil;
pub mod crops;
pub mod harvest;
pub mod events_handler;

pub use autotile::{resolve_variant, Neighbors, SoilVariant};
pub use crops::{advance_all, plant_seed, Plant, PlantLayer, PlantRegistry};
pub use events_handler::{run_day_cycle, DayCycleOutcome};
pub use harvest::{harvestable_at, remove_plant, HarvestHitbox, Harvester};
pub use soil::{SoilCell, SoilGrid};

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<SoilGrid>()
            .init_resource::<PlantRegistry>()
            // Inbound requests
            .add_event::<ToolUseEvent>()
            .add_event::<PlantSeedEvent>()
            .add_event::<HarvestRequestEvent>()
            // Outbound notifications
            .add_event::<SoilTilledEvent>()
            .add_event::<SoilWateredEvent>()
            .add_event::<CropPlantedEvent>()
            .add_event::<CropHarvestedEvent>()
            .add_event::<PlaySfxEvent>()
            // ------------------------------------------------------------------
            // Grid construction — once, from the map layout
            // ------------------------------------------------------------------
            .add_systems(OnEnter(GameState::Playing), build_soil_grid)
            // ------------------------------------------------------------------
            // Per-frame: player actions, then the day boundary, then pick-up.
            // Chained so every mutation of a frame lands before the next reads.
            // ------------------------------------------------------------------
            .add_systems(
                Update,
                (
                    soil::handle_tool_use,
                    crops::handle_plant_seed,
                    events_handler::on_day_end,
                    harvest::handle_harvest_request,
                    harvest::collect_ripe_crops,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Build the soil grid from the [`FarmLayout`] resource the first time the
/// farm is entered. Later entries (e.g. leaving the shop) keep the grid.
fn build_soil_grid(layout: Option<Res<FarmLayout>>, mut grid: ResMut<SoilGrid>) {
    if grid.is_initialized() {
        return;
    }
    let Some(layout) = layout else {
        warn!("[Farming] No FarmLayout resource — the farm has no soil");
        return;
    };
    grid.initialize(&layout);
}
