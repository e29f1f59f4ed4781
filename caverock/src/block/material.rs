//! Material properties of the blocks the carvers interact with.

use crate::block;


/// Return true if a block is a still or moving liquid.
#[inline]
pub fn is_liquid(id: u8) -> bool {
    matches!(id, block::WATER_MOVING | block::WATER_STILL | block::LAVA_MOVING | block::LAVA_STILL)
}

/// Return true if a block is still or moving water.
#[inline]
pub fn is_water(id: u8) -> bool {
    matches!(id, block::WATER_MOVING | block::WATER_STILL)
}

/// Return true if a block is the top block of the natural terrain.
#[inline]
pub fn is_top_surface(id: u8) -> bool {
    matches!(id, block::GRASS)
}

/// Return true if the given block can be carved out, the block above is needed because
/// trees and water must not lose their support.
pub fn is_carvable(id: u8, above_id: u8) -> bool {

    // Never dig out under a tree trunk.
    if above_id == block::LOG {
        return false;
    }

    match id {
        block::STONE |
        block::GRASS |
        block::DIRT |
        block::SANDSTONE |
        block::CLAY |
        block::SNOW |
        block::COAL_ORE |
        block::IRON_ORE |
        block::GOLD_ORE |
        block::LAPIS_ORE |
        block::DIAMOND_ORE |
        block::REDSTONE_ORE |
        block::REDSTONE_ORE_LIT => true,
        // Falling blocks would pour water into the cave.
        block::SAND |
        block::GRAVEL => !is_water(above_id),
        _ => false,
    }

}
