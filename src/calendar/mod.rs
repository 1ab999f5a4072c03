//! Calendar domain — day counter and daily weather.
//!
//! Responsible for:
//! - Rolling the first day's weather when the farm is entered
//! - Owning the day-boundary events (the roll for later days happens inside
//!   the farming day-cycle chain, between drying and rain)
//! - Logging each new day

use bevy::prelude::*;

use crate::shared::*;

pub struct CalendarPlugin;

impl Plugin for CalendarPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<Calendar>()
            .init_resource::<WeatherRng>()
            .add_event::<DayEndEvent>()
            .add_event::<NewDayEvent>()
            .add_systems(OnEnter(GameState::Playing), roll_first_day_weather)
            .add_systems(
                Update,
                log_new_day.run_if(in_state(GameState::Playing)),
            );
    }
}

/// Roll day one's weather the first time Playing is entered.
fn roll_first_day_weather(
    mut rolled: Local<bool>,
    mut calendar: ResMut<Calendar>,
    mut weather_rng: ResMut<WeatherRng>,
) {
    if *rolled {
        return;
    }
    *rolled = true;
    calendar.raining = Calendar::roll_rain(&mut weather_rng.0);
    info!(
        "[Calendar] Day {} begins — {}",
        calendar.day,
        if calendar.raining { "raining" } else { "clear" }
    );
}

fn log_new_day(mut new_day_events: EventReader<NewDayEvent>) {
    for event in new_day_events.read() {
        info!(
            "[Calendar] Day {} begins — {}",
            event.day,
            if event.raining { "raining" } else { "clear" }
        );
    }
}
