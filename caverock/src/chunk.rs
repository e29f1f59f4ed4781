//! A chunk storing block ids, and the voxel buffer abstraction carvers write through.

use glam::IVec3;

use crate::block::{self, material};


/// Chunk size in both X and Z coordinates.
pub const CHUNK_WIDTH: usize = 16;
/// Chunk height.
pub const CHUNK_HEIGHT: usize = 256;
/// Internal chunk size, in number of elements per chunk.
const CHUNK_SIZE: usize = CHUNK_HEIGHT * CHUNK_WIDTH * CHUNK_WIDTH;


/// Calculate the index in the chunk's array for the given chunk-local position, the
/// layout is `xxxx zzzz yyyy yyyy` so that a column is contiguous.
#[inline]
fn calc_index(pos: IVec3) -> usize {
    debug_assert!(pos.y >= 0 && pos.y < CHUNK_HEIGHT as i32);
    let x = pos.x as u32 & 0b1111;
    let z = pos.z as u32 & 0b1111;
    let y = pos.y as u32 & 0b11111111;
    ((x << 12) | (z << 8) | y) as usize
}

/// Return true if the given position is a valid chunk-local position.
#[inline]
pub fn is_local(pos: IVec3) -> bool {
    pos.x >= 0 && pos.x < CHUNK_WIDTH as i32
        && pos.z >= 0 && pos.z < CHUNK_WIDTH as i32
        && pos.y >= 0 && pos.y < CHUNK_HEIGHT as i32
}


/// Storage that carvers read and replace blocks in. Positions are chunk-local for X
/// and Z (0 to 15) and absolute for Y (0 to 255), carvers never call these methods with
/// positions outside of these bounds.
pub trait VoxelBuffer {

    /// Get the block id at the given chunk-local position.
    fn block(&self, pos: IVec3) -> u8;

    /// Replace the block id at the given chunk-local position.
    fn set_block(&mut self, pos: IVec3, id: u8);

    /// Return true if the block at the given position is a liquid.
    #[inline]
    fn is_liquid(&self, pos: IVec3) -> bool {
        material::is_liquid(self.block(pos))
    }

    /// Return true if the block at the given position is the top block of the terrain,
    /// carving it exposes the block below to the sky.
    #[inline]
    fn is_top_surface(&self, pos: IVec3) -> bool {
        material::is_top_surface(self.block(pos))
    }

}


/// Data structure storing every block id of a 16x256x16 chunk.
#[derive(Clone)]
pub struct Chunk {
    /// The numeric identifier of the block.
    block: ChunkByteArray,
}

impl Chunk {

    /// Create a new empty chunk, full of air blocks.
    pub fn new() -> Box<Self> {
        Box::new(Self {
            block: [block::AIR; CHUNK_SIZE],
        })
    }

    /// Fill the given chunk area with given block id.
    /// Panics if Y component of the area is not between 0 and 256 (excluded).
    pub fn fill_block(&mut self, start: IVec3, size: IVec3, id: u8) {

        for x in start.x..start.x + size.x {
            for z in start.z..start.z + size.z {
                let mut index = calc_index(IVec3::new(x, start.y, z));
                for _ in start.y..start.y + size.y {
                    self.block[index] = id;
                    // Increment Y component.
                    index += 1;
                }
            }
        }

    }

    /// Return the whole column of block ids at the given chunk-local X and Z, indexed
    /// by Y.
    #[inline]
    pub fn column(&self, x: i32, z: i32) -> &[u8] {
        let start = calc_index(IVec3::new(x, 0, z));
        &self.block[start..start + CHUNK_HEIGHT]
    }

}

impl VoxelBuffer for Chunk {

    #[inline]
    fn block(&self, pos: IVec3) -> u8 {
        self.block[calc_index(pos)]
    }

    #[inline]
    fn set_block(&mut self, pos: IVec3, id: u8) {
        self.block[calc_index(pos)] = id;
    }

}

/// Type alias for a chunk array that stores `u8 * CHUNK_SIZE` values.
type ChunkByteArray = [u8; CHUNK_SIZE];
