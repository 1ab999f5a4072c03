//! Soil grid — per-tile flags, tilling and watering.

use bevy::prelude::*;
use crate::shared::*;
use super::autotile::{retile_around, SoilVariant};

/// One tile of the soil grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SoilCell {
    pub flags: CellFlags,
    /// Resolved graphic; `Some` exactly when the cell is tilled.
    pub variant: Option<SoilVariant>,
}

/// Dense, fixed-size grid of soil tiles. Built once from a [`FarmLayout`].
///
/// Read freely from anywhere; mutation goes through the operations here (and
/// the crate-private Planted helpers used by planting and harvesting).
#[derive(Resource, Debug, Clone, Default)]
pub struct SoilGrid {
    rows: usize,
    cols: usize,
    tile_size: f32,
    cells: Vec<SoilCell>,
    initialized: bool,
}

impl SoilGrid {
    pub fn new(layout: &FarmLayout) -> Self {
        let mut grid = Self::default();
        grid.initialize(layout);
        grid
    }

    /// Allocate the grid and mark the farmable tiles. Only the first call has
    /// any effect.
    pub fn initialize(&mut self, layout: &FarmLayout) -> bool {
        if self.initialized {
            warn!("[Farming] Soil grid already initialized — ignoring new layout");
            return false;
        }

        self.rows = layout.rows;
        self.cols = layout.cols;
        self.tile_size = layout.tile_size;
        self.cells = vec![SoilCell::default(); layout.rows * layout.cols];
        self.initialized = true;

        let mut farmable = 0;
        for &cell in &layout.farmable {
            match self.index(cell) {
                Some(i) => {
                    self.cells[i].flags.insert(CellFlags::FARMABLE);
                    farmable += 1;
                }
                None => warn!(
                    "[Farming] Farmable cell ({}, {}) lies outside the {}x{} grid — skipped",
                    cell.row, cell.col, self.rows, self.cols
                ),
            }
        }

        info!(
            "[Farming] Soil grid ready: {} rows x {} cols, {} farmable tiles",
            self.rows, self.cols, farmable
        );
        true
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn index(&self, cell: CellIndex) -> Option<usize> {
        (cell.row < self.rows && cell.col < self.cols).then(|| cell.row * self.cols + cell.col)
    }

    /// Map a world point (y-down pixels) to the tile under it.
    pub fn cell_at(&self, point: Vec2) -> Option<CellIndex> {
        if !point.is_finite() || point.x < 0.0 || point.y < 0.0 || self.tile_size <= 0.0 {
            return None;
        }
        let cell = CellIndex::new(
            (point.y / self.tile_size).floor() as usize,
            (point.x / self.tile_size).floor() as usize,
        );
        self.index(cell).map(|_| cell)
    }

    /// World-space rectangle covered by `cell`.
    pub fn cell_rect(&self, cell: CellIndex) -> Rect {
        let min = Vec2::new(cell.col as f32, cell.row as f32) * self.tile_size;
        Rect::from_corners(min, min + Vec2::splat(self.tile_size))
    }

    /// Flags of `cell`; empty for cells off the grid.
    pub fn flags(&self, cell: CellIndex) -> CellFlags {
        self.index(cell)
            .map(|i| self.cells[i].flags)
            .unwrap_or_default()
    }

    pub fn variant(&self, cell: CellIndex) -> Option<SoilVariant> {
        self.index(cell).and_then(|i| self.cells[i].variant)
    }

    pub(super) fn set_variant(&mut self, cell: CellIndex, variant: SoilVariant) {
        if let Some(i) = self.index(cell) {
            self.cells[i].variant = Some(variant);
        }
    }

    pub fn is_tilled(&self, cell: CellIndex) -> bool {
        self.flags(cell).contains(CellFlags::TILLED)
    }

    pub fn is_planted(&self, cell: CellIndex) -> bool {
        self.flags(cell).contains(CellFlags::PLANTED)
    }

    pub fn is_watered_cell(&self, cell: CellIndex) -> bool {
        self.flags(cell).contains(CellFlags::WATERED)
    }

    /// Whether the tile under `point` is watered. False off the grid.
    pub fn is_watered(&self, point: Vec2) -> bool {
        self.cell_at(point)
            .map(|cell| self.is_watered_cell(cell))
            .unwrap_or(false)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Player actions
    // ─────────────────────────────────────────────────────────────────────

    /// Hoe the tile under `point`. Only farmable, untilled tiles take it.
    pub fn till(&mut self, point: Vec2) -> bool {
        self.cell_at(point)
            .map(|cell| self.till_cell(cell))
            .unwrap_or(false)
    }

    pub fn till_cell(&mut self, cell: CellIndex) -> bool {
        let Some(i) = self.index(cell) else {
            return false;
        };
        let flags = self.cells[i].flags;
        if !flags.contains(CellFlags::FARMABLE) || flags.contains(CellFlags::TILLED) {
            return false;
        }

        self.cells[i].flags.insert(CellFlags::TILLED);
        retile_around(self, cell);
        true
    }

    /// Water the tile under `point`. Only tilled, dry tiles take it.
    pub fn water(&mut self, point: Vec2) -> bool {
        self.cell_at(point)
            .map(|cell| self.water_cell(cell))
            .unwrap_or(false)
    }

    pub fn water_cell(&mut self, cell: CellIndex) -> bool {
        let Some(i) = self.index(cell) else {
            return false;
        };
        let flags = self.cells[i].flags;
        if !flags.contains(CellFlags::TILLED) || flags.contains(CellFlags::WATERED) {
            return false;
        }

        self.cells[i].flags.insert(CellFlags::WATERED);
        true
    }

    // ─────────────────────────────────────────────────────────────────────
    // Day-cycle bulk operations
    // ─────────────────────────────────────────────────────────────────────

    /// Rain: water every tilled tile that is still dry. Returns the tiles that
    /// changed, so presentation can add overlays for just those.
    pub fn water_all(&mut self) -> Vec<CellIndex> {
        let cols = self.cols;
        let mut watered = Vec::new();

        for (i, soil) in self.cells.iter_mut().enumerate() {
            if soil.flags.contains(CellFlags::TILLED) && !soil.flags.contains(CellFlags::WATERED) {
                soil.flags.insert(CellFlags::WATERED);
                watered.push(CellIndex::new(i / cols, i % cols));
            }
        }

        watered
    }

    /// Dry out the whole grid. Returns how many tiles were wet.
    pub fn remove_water(&mut self) -> usize {
        let mut dried = 0;
        for soil in &mut self.cells {
            if soil.flags.contains(CellFlags::WATERED) {
                soil.flags.remove(CellFlags::WATERED);
                dried += 1;
            }
        }
        dried
    }

    // ─────────────────────────────────────────────────────────────────────
    // Planted flag — owned jointly with the plant registry
    // ─────────────────────────────────────────────────────────────────────

    pub(crate) fn set_planted(&mut self, cell: CellIndex) -> bool {
        let Some(i) = self.index(cell) else {
            return false;
        };
        let flags = self.cells[i].flags;
        if !flags.contains(CellFlags::TILLED) || flags.contains(CellFlags::PLANTED) {
            return false;
        }
        self.cells[i].flags.insert(CellFlags::PLANTED);
        true
    }

    pub(crate) fn clear_planted(&mut self, cell: CellIndex) -> bool {
        let Some(i) = self.index(cell) else {
            return false;
        };
        if !self.cells[i].flags.contains(CellFlags::PLANTED) {
            return false;
        }
        self.cells[i].flags.remove(CellFlags::PLANTED);
        true
    }

    // ─────────────────────────────────────────────────────────────────────
    // Iteration for sprite sync
    // ─────────────────────────────────────────────────────────────────────

    fn cells_with(&self, flag: CellFlags) -> impl Iterator<Item = CellIndex> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, soil)| soil.flags.contains(flag))
            .map(move |(i, _)| CellIndex::new(i / cols, i % cols))
    }

    pub fn tilled_cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.cells_with(CellFlags::TILLED)
    }

    pub fn watered_cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.cells_with(CellFlags::WATERED)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hoe & watering can
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_tool_use(
    mut tool_events: EventReader<ToolUseEvent>,
    mut grid: ResMut<SoilGrid>,
    calendar: Res<Calendar>,
    mut tilled_events: EventWriter<SoilTilledEvent>,
    mut watered_events: EventWriter<SoilWateredEvent>,
    mut sfx_events: EventWriter<PlaySfxEvent>,
) {
    for event in tool_events.read() {
        let Some(cell) = grid.cell_at(event.target) else {
            continue;
        };

        match event.tool {
            ToolKind::Hoe => {
                if !grid.till_cell(cell) {
                    continue;
                }
                debug!("[Farming] Tilled ({}, {})", cell.row, cell.col);
                tilled_events.send(SoilTilledEvent { cell });
                sfx_events.send(PlaySfxEvent { sfx_id: "hoe".to_string() });

                // Fresh soil on a rainy day is wet straight away.
                if calendar.raining && grid.water_cell(cell) {
                    watered_events.send(SoilWateredEvent { cell });
                }
            }
            ToolKind::WateringCan => {
                if !grid.water_cell(cell) {
                    continue;
                }
                debug!("[Farming] Watered ({}, {})", cell.row, cell.col);
                watered_events.send(SoilWateredEvent { cell });
                sfx_events.send(PlaySfxEvent { sfx_id: "water".to_string() });
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
