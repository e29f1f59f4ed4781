//! Surface altitude estimation from the blocks of a chunk.

use glam::IVec3;

use crate::chunk::{VoxelBuffer, CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::block;


/// Width of a sub-chunk, in columns.
const SUB_CHUNK_WIDTH: i32 = 4;


/// Return the altitude of the highest block of the column that is neither air nor a
/// liquid, or 0 if there is none.
pub fn surface_altitude<B>(buffer: &B, x: i32, z: i32) -> i32
where
    B: VoxelBuffer + ?Sized,
{
    (0..CHUNK_HEIGHT as i32).rev()
        .find(|&y| {
            let pos = IVec3::new(x, y, z);
            buffer.block(pos) != block::AIR && !buffer.is_liquid(pos)
        })
        .unwrap_or(0)
}


/// Lowest and highest surface altitudes over a group of columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceBounds {
    pub min: i32,
    pub max: i32,
}

impl SurfaceBounds {

    fn of_columns<B, I>(buffer: &B, columns: I) -> Self
    where
        B: VoxelBuffer + ?Sized,
        I: IntoIterator<Item = (i32, i32)>,
    {
        let mut min = i32::MAX;
        let mut max = 0;
        for (x, z) in columns {
            let altitude = surface_altitude(buffer, x, z);
            min = min.min(altitude);
            max = max.max(altitude);
        }
        Self { min: min.min(max), max }
    }

    /// Surface bounds over all columns of the chunk.
    pub fn of_chunk<B>(buffer: &B) -> Self
    where
        B: VoxelBuffer + ?Sized,
    {
        let width = CHUNK_WIDTH as i32;
        Self::of_columns(buffer, (0..width).flat_map(|x| (0..width).map(move |z| (x, z))))
    }

    /// Surface bounds over the 4x4 columns of the given sub-chunk, sub-chunk coordinates
    /// range from 0 to 3.
    pub fn of_sub_chunk<B>(buffer: &B, sx: i32, sz: i32) -> Self
    where
        B: VoxelBuffer + ?Sized,
    {
        let x_start = sx * SUB_CHUNK_WIDTH;
        let z_start = sz * SUB_CHUNK_WIDTH;
        Self::of_columns(buffer, (x_start..x_start + SUB_CHUNK_WIDTH)
            .flat_map(|x| (z_start..z_start + SUB_CHUNK_WIDTH).map(move |z| (x, z))))
    }

}
