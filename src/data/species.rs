use crate::shared::*;

/// Populate the SpeciesRegistry with every crop the farm can grow.
///
/// Both crops have four sprite frames (seed, sprout, young, ripe), so their
/// max age is 3. Corn gains a full frame per watered day and ripens in 3 days;
/// tomato gains 0.7 and ripens on day 5.
pub fn populate_species(registry: &mut SpeciesRegistry) {
    registry.species.insert(
        Species::Corn,
        SpeciesDef {
            frame_count: 4,
            growth_rate: 1.0,
            // Corn is taller; sink it further into the tile.
            y_offset: -16.0,
            frame_size: [64.0, 64.0],
            hitbox_shrink: [26.0, 0.4],
        },
    );

    registry.species.insert(
        Species::Tomato,
        SpeciesDef {
            frame_count: 4,
            growth_rate: 0.7,
            y_offset: -8.0,
            frame_size: [64.0, 64.0],
            hitbox_shrink: [26.0, 0.4],
        },
    );
}

/// Parse a species table from RON, e.g.
///
/// ```ron
/// (species: {
///     Corn: (frame_count: 4, growth_rate: 1.0, y_offset: -16.0,
///            frame_size: (64.0, 64.0), hitbox_shrink: (26.0, 0.4)),
/// })
/// ```
///
/// Entries with no frames or a non-positive growth rate would never ripen
/// and are rejected.
pub fn species_from_ron_str(source: &str) -> Result<SpeciesRegistry, String> {
    let registry: SpeciesRegistry =
        ron::from_str(source).map_err(|e| format!("Species table parse failed: {}", e))?;

    for (species, def) in &registry.species {
        if def.frame_count == 0 {
            return Err(format!("Species {:?} has no sprite frames", species));
        }
        if !(def.growth_rate > 0.0) {
            return Err(format!(
                "Species {:?} has growth rate {} — must be positive",
                species, def.growth_rate
            ));
        }
    }

    Ok(registry)
}
