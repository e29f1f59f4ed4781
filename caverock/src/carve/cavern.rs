//! Per-voxel cavern carver.

use std::sync::Arc;

use glam::IVec3;
use tracing::{debug, trace};

use crate::chunk::{self, VoxelBuffer, CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::util::{JavaRandom, FractalNoise, Turbulence};
use crate::block;

use super::params::{CavernParams, ParamsError};
use super::stats::NoiseObserver;
use super::dig_block;


/// Neighbors checked for liquid before carving a voxel.
const LIQUID_NEIGHBORS: [IVec3; 5] = [
    IVec3::Y,
    IVec3::X,
    IVec3::NEG_X,
    IVec3::Z,
    IVec3::NEG_Z,
];


/// A cavern carver, carving voxels where the product of two noise fields exceeds a
/// threshold.
pub struct CavernCarver {
    params: CavernParams,
    first: FractalNoise,
    second: FractalNoise,
    turbulence: Option<Turbulence>,
    observer: Option<Arc<dyn NoiseObserver>>,
}

impl CavernCarver {

    /// Create a new cavern carver from the given seed, parameters are validated.
    pub fn new(seed: i64, params: CavernParams) -> Result<Self, ParamsError> {

        params.validate()?;

        let mut rand = JavaRandom::new(seed);
        let first = FractalNoise::new(&mut rand.fork(), &params.fractal);
        let second = FractalNoise::new(&mut rand.fork(), &params.fractal);
        let turbulence = params.turbulence.as_ref()
            .map(|settings| Turbulence::new(&mut rand.fork(), settings));

        debug!("cavern carver with threshold {} up to {}", params.noise_threshold, params.top_y);

        Ok(Self {
            params,
            first,
            second,
            turbulence,
            observer: None,
        })

    }

    /// Attach an observer of the noise products compared to the threshold.
    pub fn with_observer(mut self, observer: Arc<dyn NoiseObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn set_observer(&mut self, observer: Option<Arc<dyn NoiseObserver>>) {
        self.observer = observer;
    }

    #[inline]
    pub fn params(&self) -> &CavernParams {
        &self.params
    }

    /// Sample both noise fields at the given world position.
    pub fn sample_fields(&self, pos: IVec3) -> (f64, f64) {
        let mut pos = pos.as_dvec3();
        if let Some(turbulence) = &self.turbulence {
            pos = turbulence.perturb(pos);
        }
        (self.first.sample_3d(pos), self.second.sample_3d(pos))
    }

    /// Carve caverns in the whole chunk at the given chunk coordinates.
    pub fn carve_chunk<B>(&self, buffer: &mut B, cx: i32, cz: i32, liquid: u8)
    where
        B: VoxelBuffer + ?Sized,
    {
        self.carve_chunk_with_noise(buffer, cx, cz, liquid, |pos| self.sample_fields(pos));
    }

    /// Carve caverns in the whole chunk, the given function returns the value of both
    /// noise fields at a world position.
    pub fn carve_chunk_with_noise<B, F>(&self, buffer: &mut B, cx: i32, cz: i32, liquid: u8, mut fields: F)
    where
        B: VoxelBuffer + ?Sized,
        F: FnMut(IVec3) -> (f64, f64),
    {

        let top_y = self.params.top_y.min(CHUNK_HEIGHT as i32 - 1);
        let chunk_origin = IVec3::new(cx * CHUNK_WIDTH as i32, 0, cz * CHUNK_WIDTH as i32);

        // Liquids as they were before carving, liquid placed by this carver never
        // prevents carving around it.
        let liquid_mask = LiquidMask::new(buffer, top_y + 2);
        let mut carved = 0usize;

        for x in 0..CHUNK_WIDTH as i32 {
            for z in 0..CHUNK_WIDTH as i32 {
                for y in (1..=top_y).rev() {

                    let pos = IVec3::new(x, y, z);
                    let (first, second) = fields(chunk_origin + pos);
                    let product = first * second;

                    if let Some(observer) = &self.observer {
                        observer.observe(product);
                    }

                    let carve = product > self.params.noise_threshold
                        && !liquid_mask.near_liquid(pos);

                    if self.params.debug_visualizer {
                        buffer.set_block(pos, if carve { self.params.debug_block } else { block::AIR });
                    } else if carve && dig_block(buffer, pos, liquid, self.params.liquid_altitude) {
                        carved += 1;
                    }

                }
            }
        }

        trace!("carved {carved} cavern voxels in chunk {cx}/{cz}");

    }

}


/// Liquid state of the chunk voxels from 0 up to a given height.
struct LiquidMask {
    height: i32,
    liquid: Vec<bool>,
}

impl LiquidMask {

    fn new<B>(buffer: &B, height: i32) -> Self
    where
        B: VoxelBuffer + ?Sized,
    {
        let height = height.min(CHUNK_HEIGHT as i32);
        let mut liquid = Vec::with_capacity(CHUNK_WIDTH * CHUNK_WIDTH * height as usize);
        for x in 0..CHUNK_WIDTH as i32 {
            for z in 0..CHUNK_WIDTH as i32 {
                for y in 0..height {
                    liquid.push(buffer.is_liquid(IVec3::new(x, y, z)));
                }
            }
        }
        Self { height, liquid }
    }

    #[inline]
    fn is_liquid(&self, pos: IVec3) -> bool {
        if !chunk::is_local(pos) || pos.y >= self.height {
            return false;
        }
        let index = (pos.x as usize * CHUNK_WIDTH + pos.z as usize) * self.height as usize + pos.y as usize;
        self.liquid[index]
    }

    /// Return true if the voxel above or any horizontal neighbor within the chunk is a
    /// liquid.
    #[inline]
    fn near_liquid(&self, pos: IVec3) -> bool {
        LIQUID_NEIGHBORS.iter().any(|&offset| self.is_liquid(pos + offset))
    }

}
