//! Noise threshold cave and cavern carving for 16x256x16 voxel chunks.

pub mod util;
pub mod block;
pub mod chunk;
pub mod carve;
pub mod pool;
