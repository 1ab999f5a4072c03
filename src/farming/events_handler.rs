//! Day boundary — the once-per-day chain that dries the soil, rerolls the
//! weather, lets rain water the field and then grows the crops.
//!
//! The order is fixed: growth reads the watered state set *after* the reroll,
//! so a rainy new day grows every planted crop and a dry one grows none.

use bevy::prelude::*;
use crate::shared::*;
use super::crops::{advance_all, PlantRegistry};
use super::soil::SoilGrid;

/// What one day boundary changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayCycleOutcome {
    pub dried: usize,
    pub raining: bool,
    /// Tiles the rain watered (need a water overlay).
    pub rain_watered: Vec<CellIndex>,
    pub ripened: Vec<CellIndex>,
}

/// Run the day boundary. `reroll_weather` decides whether the new day rains.
pub fn run_day_cycle(
    grid: &mut SoilGrid,
    plants: &mut PlantRegistry,
    reroll_weather: impl FnOnce() -> bool,
) -> DayCycleOutcome {
    let dried = grid.remove_water();
    let raining = reroll_weather();
    let rain_watered = if raining { grid.water_all() } else { Vec::new() };
    let ripened = advance_all(plants, grid);

    DayCycleOutcome { dried, raining, rain_watered, ripened }
}

pub fn on_day_end(
    mut day_end_events: EventReader<DayEndEvent>,
    mut grid: ResMut<SoilGrid>,
    mut plants: ResMut<PlantRegistry>,
    mut calendar: ResMut<Calendar>,
    mut weather_rng: ResMut<WeatherRng>,
    mut watered_events: EventWriter<SoilWateredEvent>,
    mut new_day_events: EventWriter<NewDayEvent>,
) {
    for _ in day_end_events.read() {
        let outcome = run_day_cycle(&mut grid, &mut plants, || {
            calendar.start_next_day(&mut weather_rng.0)
        });

        for &cell in &outcome.rain_watered {
            watered_events.send(SoilWateredEvent { cell });
        }

        info!(
            "[Farming] Day {} — rain: {}, dried {} tiles, {} crops ripened",
            calendar.day,
            outcome.raining,
            outcome.dried,
            outcome.ripened.len()
        );

        new_day_events.send(NewDayEvent { day: calendar.day, raining: outcome.raining });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
