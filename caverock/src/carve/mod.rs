//! Noise threshold carving.
//!
//! Caves are carved column by column: the noise tuples of the column are sampled, their
//! headroom is adjusted, each voxel is carved if all of its noise values reach the
//! threshold of its altitude, and finally single floating voxels left near the surface
//! are removed. Caverns are carved voxel by voxel over a whole chunk from the product of
//! two noise fields.

use std::sync::Arc;

use glam::IVec3;
use tracing::trace;

use crate::chunk::{VoxelBuffer, CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::block::{self, material};
use crate::util::JavaRandom;

mod params;
mod threshold;
mod column;
mod headroom;
mod cave;
mod cavern;
mod stats;
mod surface;

pub use params::{parameters_for, CarverStyle, CarverParameters, CaveParams, CavernParams,
    HeadroomSettings, ParamsError};
pub use threshold::{RampCurve, ThresholdProfile, ThresholdTable};
pub use column::{NoiseColumn, ColumnNoiseSampler};
pub use headroom::{adjust_headroom, passes};
pub use cave::CaveCarver;
pub use cavern::CavernCarver;
pub use stats::{NoiseObserver, NoiseStats, NoiseReport};
pub use surface::{surface_altitude, SurfaceBounds};


/// Position of a column: chunk coordinates and chunk-local X/Z coordinates. Local
/// coordinates are not wrapped, carvers ignore columns outside of the chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnPos {
    pub cx: i32,
    pub cz: i32,
    pub x: i32,
    pub z: i32,
}

impl ColumnPos {

    #[inline]
    pub fn world_x(self) -> i32 {
        self.cx * CHUNK_WIDTH as i32 + self.x
    }

    #[inline]
    pub fn world_z(self) -> i32 {
        self.cz * CHUNK_WIDTH as i32 + self.z
    }

    /// Return true if the local coordinates are within the chunk.
    #[inline]
    pub fn is_local(self) -> bool {
        (0..CHUNK_WIDTH as i32).contains(&self.x) && (0..CHUNK_WIDTH as i32).contains(&self.z)
    }

    /// Chunk-local position of the voxel at the given altitude in this column.
    #[inline]
    pub fn voxel(self, y: i32) -> IVec3 {
        IVec3::new(self.x, y, self.z)
    }

}


/// Vertical bounds of a column carving, surface heights may be approximated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpan {
    /// Lowest altitude to carve, inclusive.
    pub bottom_y: i32,
    /// Highest altitude to carve, inclusive.
    pub top_y: i32,
    /// Highest surface altitude around this column.
    pub max_surface: i32,
    /// Lowest surface altitude around this column.
    pub min_surface: i32,
}

impl ColumnSpan {

    /// Return true if both bounds are valid chunk altitudes.
    #[inline]
    pub fn is_valid(&self) -> bool {
        let range = 0..CHUNK_HEIGHT as i32;
        range.contains(&self.bottom_y) && range.contains(&self.top_y)
    }

}


/// Dig the block at the given chunk-local position if it can be carved. The block is
/// replaced with the liquid at or below the liquid altitude, and with air above. When
/// a top surface block is carved, the dirt below it becomes the new top surface.
/// Return true if the block has been dug.
pub fn dig_block<B>(buffer: &mut B, pos: IVec3, liquid: u8, liquid_altitude: i32) -> bool
where
    B: VoxelBuffer + ?Sized,
{

    let id = buffer.block(pos);
    let above_id = if pos.y + 1 < CHUNK_HEIGHT as i32 {
        buffer.block(pos + IVec3::Y)
    } else {
        block::AIR
    };

    if !material::is_carvable(id, above_id) {
        return false;
    }

    if pos.y <= liquid_altitude {
        buffer.set_block(pos, liquid);
    } else {

        let carving_surface = buffer.is_top_surface(pos);
        buffer.set_block(pos, block::AIR);

        if carving_surface && pos.y > 0 {
            let below_pos = pos - IVec3::Y;
            if buffer.block(below_pos) == block::DIRT {
                buffer.set_block(below_pos, block::GRASS);
            }
        }

    }

    true

}


/// Carves whole chunks with any number of cave and cavern carvers, surface heights are
/// estimated from the chunk itself before carving.
pub struct ChunkCarver {
    caves: Vec<CaveCarver>,
    caverns: Vec<CavernCarver>,
    /// Block filling carved voxels at low altitude.
    liquid: u8,
}

impl ChunkCarver {

    /// Create a chunk carver without any carver.
    pub fn new(liquid: u8) -> Self {
        Self {
            caves: Vec::new(),
            caverns: Vec::new(),
            liquid,
        }
    }

    /// Build one carver per parameters, each seeded from its own stream derived from
    /// the given seed.
    pub fn from_parameters<I>(seed: i64, params: I, liquid: u8) -> Result<Self, ParamsError>
    where
        I: IntoIterator<Item = CarverParameters>,
    {

        let mut rand = JavaRandom::new(seed);
        let mut ret = Self::new(liquid);

        for params in params {
            let carver_seed = rand.next_long();
            match params {
                CarverParameters::Cave(params) =>
                    ret.caves.push(CaveCarver::new(carver_seed, params)?),
                CarverParameters::Cavern(params) =>
                    ret.caverns.push(CavernCarver::new(carver_seed, params)?),
            }
        }

        Ok(ret)

    }

    /// Build one carver per style with its default parameters.
    pub fn from_styles(seed: i64, styles: &[CarverStyle], liquid: u8) -> Result<Self, ParamsError> {
        Self::from_parameters(seed, styles.iter().map(|&style| parameters_for(style)), liquid)
    }

    pub fn with_cave(mut self, carver: CaveCarver) -> Self {
        self.caves.push(carver);
        self
    }

    pub fn with_cavern(mut self, carver: CavernCarver) -> Self {
        self.caverns.push(carver);
        self
    }

    /// Attach the given observer to every carver.
    pub fn observed_by(mut self, observer: Arc<dyn NoiseObserver>) -> Self {
        for carver in &mut self.caves {
            carver.set_observer(Some(Arc::clone(&observer)));
        }
        for carver in &mut self.caverns {
            carver.set_observer(Some(Arc::clone(&observer)));
        }
        self
    }

    /// Carve the given chunk. Caves are carved first, column by column, then caverns.
    pub fn carve<B>(&self, buffer: &mut B, cx: i32, cz: i32)
    where
        B: VoxelBuffer + ?Sized,
    {

        // Surface must be estimated before any carving opens it.
        let view: &B = buffer;
        let bounds: [[SurfaceBounds; 4]; 4] = std::array::from_fn(|sx| {
            std::array::from_fn(|sz| SurfaceBounds::of_sub_chunk(view, sx as i32, sz as i32))
        });

        for carver in &self.caves {
            for x in 0..CHUNK_WIDTH as i32 {
                for z in 0..CHUNK_WIDTH as i32 {
                    let bounds = bounds[x as usize / 4][z as usize / 4];
                    let span = ColumnSpan {
                        bottom_y: 1,
                        top_y: bounds.max.min(CHUNK_HEIGHT as i32 - 1),
                        max_surface: bounds.max,
                        min_surface: bounds.min,
                    };
                    carver.carve_column(buffer, ColumnPos { cx, cz, x, z }, span, self.liquid);
                }
            }
        }

        for carver in &self.caverns {
            carver.carve_chunk(buffer, cx, cz, self.liquid);
        }

        trace!("carved chunk {cx}/{cz} with {} cave and {} cavern carvers", self.caves.len(), self.caverns.len());

    }

}
