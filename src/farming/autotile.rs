//! Soil autotiling — pick the tilled-dirt graphic for a cell from which of its
//! four neighbours are also tilled.

use crate::shared::*;
use super::soil::SoilGrid;

/// The sixteen tilled-soil graphics. Side names describe where the soil
/// patch has an open (untilled) border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoilVariant {
    /// All four neighbours tilled.
    Interior,
    /// Left, right and bottom tilled.
    TeeTop,
    /// Left, right and top tilled.
    TeeBottom,
    /// Left, top and bottom tilled.
    TeeRight,
    /// Right, top and bottom tilled.
    TeeLeft,
    Horizontal,
    /// Left and top tilled.
    CornerBottomRight,
    /// Left and bottom tilled.
    CornerTopRight,
    /// Right and top tilled.
    CornerBottomLeft,
    /// Right and bottom tilled.
    CornerTopLeft,
    Vertical,
    /// Only the left neighbour tilled.
    EdgeRight,
    /// Only the right neighbour tilled.
    EdgeLeft,
    /// Only the top neighbour tilled.
    EdgeBottom,
    /// Only the bottom neighbour tilled.
    EdgeTop,
    Isolated,
}

impl SoilVariant {
    /// Asset key of the matching image in the soil tile folder.
    pub fn asset_key(self) -> &'static str {
        match self {
            SoilVariant::Interior => "x",
            SoilVariant::TeeTop => "tm",
            SoilVariant::TeeBottom => "bm",
            SoilVariant::TeeRight => "rm",
            SoilVariant::TeeLeft => "lm",
            SoilVariant::Horizontal => "lr",
            SoilVariant::CornerBottomRight => "br",
            SoilVariant::CornerTopRight => "tr",
            SoilVariant::CornerBottomLeft => "bl",
            SoilVariant::CornerTopLeft => "tl",
            SoilVariant::Vertical => "tb",
            SoilVariant::EdgeRight => "r",
            SoilVariant::EdgeLeft => "l",
            SoilVariant::EdgeBottom => "b",
            SoilVariant::EdgeTop => "t",
            SoilVariant::Isolated => "o",
        }
    }
}

/// Tilled status of the four orthogonal neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Neighbors {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

/// Resolve the graphic for a tilled cell.
///
/// Arms are listed in the renderer's priority order: full surround, then the
/// three-sided pieces, then pairs, then single neighbours, then none.
pub fn resolve_variant(n: Neighbors) -> SoilVariant {
    match (n.left, n.right, n.top, n.bottom) {
        (true, true, true, true) => SoilVariant::Interior,

        (true, true, false, true) => SoilVariant::TeeTop,
        (true, true, true, false) => SoilVariant::TeeBottom,
        (true, false, true, true) => SoilVariant::TeeRight,
        (false, true, true, true) => SoilVariant::TeeLeft,

        (true, true, false, false) => SoilVariant::Horizontal,
        (true, false, true, false) => SoilVariant::CornerBottomRight,
        (true, false, false, true) => SoilVariant::CornerTopRight,
        (false, true, true, false) => SoilVariant::CornerBottomLeft,
        (false, true, false, true) => SoilVariant::CornerTopLeft,
        (false, false, true, true) => SoilVariant::Vertical,

        (true, false, false, false) => SoilVariant::EdgeRight,
        (false, true, false, false) => SoilVariant::EdgeLeft,
        (false, false, true, false) => SoilVariant::EdgeBottom,
        (false, false, false, true) => SoilVariant::EdgeTop,

        (false, false, false, false) => SoilVariant::Isolated,
    }
}

/// Read the neighbour mask for `cell`. Anything off the grid counts as
/// untilled, on every edge.
pub fn neighbors_of(grid: &SoilGrid, cell: CellIndex) -> Neighbors {
    let tilled = |row: Option<usize>, col: Option<usize>| match (row, col) {
        (Some(row), Some(col)) => grid.is_tilled(CellIndex::new(row, col)),
        _ => false,
    };

    Neighbors {
        left: tilled(Some(cell.row), cell.col.checked_sub(1)),
        right: tilled(Some(cell.row), cell.col.checked_add(1)),
        top: tilled(cell.row.checked_sub(1), Some(cell.col)),
        bottom: tilled(cell.row.checked_add(1), Some(cell.col)),
    }
}

/// Recompute the variant of every tilled cell in the 3×3 block centred on
/// `cell`. Returns the cells whose variant changed.
pub fn retile_around(grid: &mut SoilGrid, cell: CellIndex) -> Vec<CellIndex> {
    let mut changed = Vec::new();

    for row in cell.row.saturating_sub(1)..=cell.row.saturating_add(1) {
        for col in cell.col.saturating_sub(1)..=cell.col.saturating_add(1) {
            let target = CellIndex::new(row, col);
            if !grid.is_tilled(target) {
                continue;
            }
            let variant = resolve_variant(neighbors_of(grid, target));
            if grid.variant(target) != Some(variant) {
                grid.set_variant(target, variant);
                changed.push(target);
            }
        }
    }

    changed
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
