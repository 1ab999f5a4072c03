//! Headless integration tests for Farmstead.
//!
//! These tests exercise the farming ECS logic without a window or GPU.
//! They use Bevy's `MinimalPlugins` to tick the app, register the domain
//! plugins, and verify that player actions and day boundaries drive the
//! soil grid and plants correctly.
//!
//! Run with: `cargo test --test headless`

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use farmstead::calendar::CalendarPlugin;
use farmstead::data::DataPlugin;
use farmstead::farming::{
    harvestable_at, remove_plant, run_day_cycle, FarmingPlugin, Harvester, PlantRegistry, SoilGrid,
    SoilVariant,
};
use farmstead::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// A 3×3 farmable plot in the top-left corner of a 5×5 map.
fn plot_layout() -> FarmLayout {
    FarmLayout {
        rows: 5,
        cols: 5,
        tile_size: TILE_SIZE,
        farmable: (0..3)
            .flat_map(|row| (0..3).map(move |col| CellIndex::new(row, col)))
            .collect(),
    }
}

/// Builds a minimal Bevy app with the domain plugins registered but NO
/// rendering, windowing, or asset loading.
fn build_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.init_state::<GameState>();

    app.insert_resource(plot_layout());
    app.insert_resource(WeatherRng::seeded(2024));

    app.add_plugins((DataPlugin, CalendarPlugin, FarmingPlugin));
    app
}

/// Ticks through Loading into Playing.
fn enter_playing_state(app: &mut App) {
    // First update enters Loading and populates registries; second applies NextState.
    app.update();
    app.update();
    assert_eq!(app.world().resource::<State<GameState>>().get(), &GameState::Playing);
}

fn playing_app(raining: bool) -> App {
    let mut app = build_test_app();
    enter_playing_state(&mut app);
    app.world_mut().resource_mut::<Calendar>().raining = raining;
    // Discard anything emitted while booting.
    drain::<SoilWateredEvent>(&mut app);
    drain::<NewDayEvent>(&mut app);
    app
}

fn point(row: usize, col: usize) -> Vec2 {
    Vec2::new((col as f32 + 0.5) * TILE_SIZE, (row as f32 + 0.5) * TILE_SIZE)
}

fn use_tool(app: &mut App, tool: ToolKind, row: usize, col: usize) {
    app.world_mut().send_event(ToolUseEvent { tool, target: point(row, col) });
}

fn sow(app: &mut App, species: Species, row: usize, col: usize) {
    app.world_mut().send_event(PlantSeedEvent { target: point(row, col), species });
}

fn drain<E: Event>(app: &mut App) -> Vec<E> {
    app.world_mut().resource_mut::<Events<E>>().drain().collect()
}

fn sfx(app: &mut App) -> Vec<String> {
    drain::<PlaySfxEvent>(app).into_iter().map(|e| e.sfx_id).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Boot
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_headless_boot_builds_grid_and_registry() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    let grid = app.world().resource::<SoilGrid>();
    assert!(grid.is_initialized());
    assert_eq!((grid.rows(), grid.cols()), (5, 5));
    assert!(grid.flags(CellIndex::new(2, 2)).contains(CellFlags::FARMABLE));
    assert!(!grid.flags(CellIndex::new(3, 3)).contains(CellFlags::FARMABLE));

    let species = app.world().resource::<SpeciesRegistry>();
    assert!(species.get(Species::Corn).is_some());
    assert!(species.get(Species::Tomato).is_some());

    // Smoke: idle frames change nothing.
    for _ in 0..60 {
        app.update();
    }
    assert_eq!(app.world().resource::<SoilGrid>().tilled_cells().count(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool use
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_hoe_tills_once_and_retiles_neighbours() {
    let mut app = playing_app(false);

    use_tool(&mut app, ToolKind::Hoe, 1, 1);
    use_tool(&mut app, ToolKind::Hoe, 1, 1);
    use_tool(&mut app, ToolKind::Hoe, 1, 0);
    use_tool(&mut app, ToolKind::Hoe, 1, 2);
    use_tool(&mut app, ToolKind::Hoe, 4, 4); // not farmable
    app.update();

    let tilled = drain::<SoilTilledEvent>(&mut app);
    assert_eq!(
        tilled.iter().map(|e| e.cell).collect::<Vec<_>>(),
        vec![CellIndex::new(1, 1), CellIndex::new(1, 0), CellIndex::new(1, 2)]
    );
    assert_eq!(sfx(&mut app), vec!["hoe", "hoe", "hoe"]);
    assert!(drain::<SoilWateredEvent>(&mut app).is_empty(), "Dry day: no auto-water");

    let grid = app.world().resource::<SoilGrid>();
    assert_eq!(grid.variant(CellIndex::new(1, 1)), Some(SoilVariant::Horizontal));
    assert_eq!(grid.variant(CellIndex::new(1, 0)), Some(SoilVariant::EdgeLeft));
    assert_eq!(grid.variant(CellIndex::new(1, 2)), Some(SoilVariant::EdgeRight));
    assert!(grid.flags(CellIndex::new(4, 4)).is_empty());
}

#[test]
fn test_tilling_in_rain_waters_immediately() {
    let mut app = playing_app(true);

    use_tool(&mut app, ToolKind::Hoe, 0, 0);
    app.update();

    assert_eq!(drain::<SoilTilledEvent>(&mut app).len(), 1);
    assert_eq!(
        drain::<SoilWateredEvent>(&mut app),
        vec![SoilWateredEvent { cell: CellIndex::new(0, 0) }]
    );
    assert!(app.world().resource::<SoilGrid>().is_watered(point(0, 0)));
}

#[test]
fn test_watering_can_waters_tilled_soil_once() {
    let mut app = playing_app(false);

    use_tool(&mut app, ToolKind::WateringCan, 2, 2); // untilled
    use_tool(&mut app, ToolKind::Hoe, 2, 2);
    use_tool(&mut app, ToolKind::WateringCan, 2, 2);
    use_tool(&mut app, ToolKind::WateringCan, 2, 2);
    app.update();

    assert_eq!(drain::<SoilWateredEvent>(&mut app).len(), 1);
    assert_eq!(sfx(&mut app), vec!["hoe", "water"]);
    assert!(app.world().resource::<SoilGrid>().is_watered(point(2, 2)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Planting
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_seed_needs_tilled_empty_soil() {
    let mut app = playing_app(false);

    sow(&mut app, Species::Corn, 0, 1); // untilled
    app.update();
    assert!(drain::<CropPlantedEvent>(&mut app).is_empty());
    assert!(app.world().resource::<PlantRegistry>().is_empty());

    // Tilling runs before planting within a frame, so hoe and seed can share one.
    use_tool(&mut app, ToolKind::Hoe, 0, 1);

    sow(&mut app, Species::Corn, 0, 1);
    sow(&mut app, Species::Tomato, 0, 1); // occupied
    app.update();

    let planted = drain::<CropPlantedEvent>(&mut app);
    assert_eq!(
        planted,
        vec![CropPlantedEvent { cell: CellIndex::new(0, 1), species: Species::Corn }]
    );
    assert!(sfx(&mut app).contains(&"plant".to_string()));

    let plants = app.world().resource::<PlantRegistry>();
    assert_eq!(plants.len(), 1);
    assert_eq!(plants.get(CellIndex::new(0, 1)).unwrap().species, Species::Corn);
    assert!(app.world().resource::<SoilGrid>().is_planted(CellIndex::new(0, 1)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Day boundary
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_day_end_dries_rerolls_and_grows_with_new_days_water() {
    let mut app = playing_app(false);

    use_tool(&mut app, ToolKind::Hoe, 0, 0);
    sow(&mut app, Species::Corn, 0, 0);
    app.update();
    use_tool(&mut app, ToolKind::WateringCan, 0, 0);
    app.update();
    drain::<SoilWateredEvent>(&mut app);

    app.world_mut().send_event(DayEndEvent);
    app.update();

    let new_days = drain::<NewDayEvent>(&mut app);
    assert_eq!(new_days.len(), 1);
    let NewDayEvent { day, raining } = new_days[0].clone();
    assert_eq!(day, 2);
    assert_eq!(app.world().resource::<Calendar>().raining, raining);

    // Yesterday's watering is gone; only today's rain (if any) counts.
    let grid = app.world().resource::<SoilGrid>();
    assert_eq!(grid.is_watered(point(0, 0)), raining);
    let age = app.world().resource::<PlantRegistry>().get(CellIndex::new(0, 0)).unwrap().age();
    assert_eq!(age, if raining { 1.0 } else { 0.0 });
    assert_eq!(drain::<SoilWateredEvent>(&mut app).len(), usize::from(raining));
}

#[test]
fn test_unwatered_crop_never_grows() {
    let mut app = playing_app(false);
    use_tool(&mut app, ToolKind::Hoe, 2, 0);
    sow(&mut app, Species::Tomato, 2, 0);
    app.update();

    app.world_mut().resource_scope(|world, mut grid: Mut<SoilGrid>| {
        let mut plants = world.resource_mut::<PlantRegistry>();
        for _ in 0..10 {
            run_day_cycle(&mut grid, &mut plants, || false);
        }
    });

    let plants = app.world().resource::<PlantRegistry>();
    assert_eq!(plants.get(CellIndex::new(2, 0)).unwrap().age(), 0.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Harvest
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_harvester_collects_ripe_crop_and_frees_tile() {
    let mut app = playing_app(false);
    use_tool(&mut app, ToolKind::Hoe, 1, 1);
    sow(&mut app, Species::Tomato, 1, 1);
    app.update();
    assert_eq!(drain::<CropPlantedEvent>(&mut app).len(), 1);

    // Five rainy days: 0.7 per day reaches 3.0 on the fifth.
    let hitbox = app.world_mut().resource_scope(|world, mut grid: Mut<SoilGrid>| {
        let mut plants = world.resource_mut::<PlantRegistry>();
        let mut ripened = Vec::new();
        for _ in 0..5 {
            ripened.extend(run_day_cycle(&mut grid, &mut plants, || true).ripened);
        }
        assert_eq!(ripened, vec![CellIndex::new(1, 1)]);
        plants.get(CellIndex::new(1, 1)).unwrap().harvest_hitbox().unwrap().rect
    });

    {
        let world = app.world();
        let grid = world.resource::<SoilGrid>();
        let found = harvestable_at(grid, world.resource::<PlantRegistry>(), point(1, 1));
        assert!(found.is_some());
    }

    // A harvester far away picks nothing up.
    app.world_mut().spawn(Harvester { hitbox: Rect::new(300.0, 300.0, 310.0, 310.0) });
    app.update();
    assert!(drain::<CropHarvestedEvent>(&mut app).is_empty());

    let touching = Rect::from_center_size(hitbox.center(), Vec2::splat(8.0));
    app.world_mut().spawn(Harvester { hitbox: touching });
    app.update();

    assert_eq!(
        drain::<CropHarvestedEvent>(&mut app),
        vec![CropHarvestedEvent { cell: CellIndex::new(1, 1), species: Species::Tomato }]
    );
    assert!(sfx(&mut app).contains(&"success".to_string()));

    let world = app.world();
    let grid = world.resource::<SoilGrid>();
    assert!(world.resource::<PlantRegistry>().is_empty());
    assert!(!grid.is_planted(CellIndex::new(1, 1)));
    assert!(harvestable_at(grid, world.resource::<PlantRegistry>(), point(1, 1)).is_none());

    // The tile takes a new seed straight away.
    sow(&mut app, Species::Corn, 1, 1);
    app.update();
    assert_eq!(
        drain::<CropPlantedEvent>(&mut app),
        vec![CropPlantedEvent { cell: CellIndex::new(1, 1), species: Species::Corn }]
    );
}

#[test]
fn test_harvest_request_picks_only_ripe_crops() {
    let mut app = playing_app(false);
    use_tool(&mut app, ToolKind::Hoe, 0, 0);
    use_tool(&mut app, ToolKind::Hoe, 2, 2);
    sow(&mut app, Species::Corn, 0, 0);
    sow(&mut app, Species::Corn, 2, 2);
    app.update();
    drain::<PlaySfxEvent>(&mut app);

    // Three rainy days ripen the corn at (0, 0); (2, 2) is replanted unripe.
    app.world_mut().resource_scope(|world, mut grid: Mut<SoilGrid>| {
        let mut plants = world.resource_mut::<PlantRegistry>();
        for _ in 0..3 {
            run_day_cycle(&mut grid, &mut plants, || true);
        }
        assert!(remove_plant(&mut grid, &mut plants, CellIndex::new(2, 2)).is_some());
    });
    sow(&mut app, Species::Tomato, 2, 2);
    app.update();
    drain::<PlaySfxEvent>(&mut app);

    // Unripe tile, empty tile, off the grid: nothing happens.
    for target in [point(2, 2), point(1, 1), Vec2::new(-10.0, 10.0)] {
        app.world_mut().send_event(HarvestRequestEvent { target });
    }
    app.update();
    assert!(drain::<CropHarvestedEvent>(&mut app).is_empty());
    assert_eq!(app.world().resource::<PlantRegistry>().len(), 2);

    app.world_mut().send_event(HarvestRequestEvent { target: point(0, 0) });
    app.update();
    assert_eq!(
        drain::<CropHarvestedEvent>(&mut app),
        vec![CropHarvestedEvent { cell: CellIndex::new(0, 0), species: Species::Corn }]
    );
    assert_eq!(sfx(&mut app), vec!["success"]);

    let world = app.world();
    assert!(!world.resource::<SoilGrid>().is_planted(CellIndex::new(0, 0)));
    assert!(world.resource::<PlantRegistry>().get(CellIndex::new(2, 2)).is_some());
}

#[test]
fn test_unripe_crop_is_not_picked_up() {
    let mut app = playing_app(false);
    use_tool(&mut app, ToolKind::Hoe, 0, 2);
    sow(&mut app, Species::Corn, 0, 2);
    app.update();

    let tile = app.world().resource::<SoilGrid>().cell_rect(CellIndex::new(0, 2));
    app.world_mut().spawn(Harvester { hitbox: tile });
    app.update();

    assert!(drain::<CropHarvestedEvent>(&mut app).is_empty());
    assert_eq!(app.world().resource::<PlantRegistry>().len(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Shop freezes the farm
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_shop_state_suspends_farm_actions() {
    let mut app = playing_app(false);
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Shop);
    app.update();

    use_tool(&mut app, ToolKind::Hoe, 0, 0);
    app.update();
    assert!(!app.world().resource::<SoilGrid>().is_tilled(CellIndex::new(0, 0)));

    // Leaving the shop must not rebuild (and wipe) the grid.
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Playing);
    app.update();
    use_tool(&mut app, ToolKind::Hoe, 2, 2);
    app.update();
    let grid = app.world().resource::<SoilGrid>();
    assert!(grid.is_tilled(CellIndex::new(2, 2)));
    assert_eq!((grid.rows(), grid.cols()), (5, 5));
}
