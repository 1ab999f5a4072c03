//! Farmstead library crate — the soil and crop-growth core of a tile-based
//! farming game.
//!
//! Rendering, input, audio and inventory live in the embedding app; this crate
//! owns the tile grid and the plants and talks to those layers only through
//! the events and resources declared in [`shared`].

pub mod shared;
pub mod calendar;
pub mod farming;
pub mod data;
