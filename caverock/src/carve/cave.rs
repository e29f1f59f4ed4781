//! Column based cave carver.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::chunk::{VoxelBuffer, CHUNK_HEIGHT};
use crate::block::{self, material};

use super::column::{NoiseColumn, ColumnNoiseSampler};
use super::headroom::{adjust_headroom, passes};
use super::params::{CaveParams, ParamsError};
use super::stats::NoiseObserver;
use super::threshold::ThresholdTable;
use super::{dig_block, ColumnPos, ColumnSpan};


/// A cave carver, carving voxels of a column where all of its noise generators reach an
/// altitude dependent threshold.
pub struct CaveCarver {
    params: CaveParams,
    sampler: ColumnNoiseSampler,
    observer: Option<Arc<dyn NoiseObserver>>,
}

impl CaveCarver {

    /// Create a new cave carver from the given seed, parameters are validated.
    pub fn new(seed: i64, params: CaveParams) -> Result<Self, ParamsError> {

        params.validate()?;

        let sampler = ColumnNoiseSampler::new(
            seed,
            &params.generators,
            params.turbulence.as_ref(),
            params.y_compression,
            params.xz_compression,
        );

        debug!("cave carver with {} generators, threshold {} to {}, surface cutoff {}",
            params.generators.len(), params.noise_threshold, params.ramp_ceiling, params.surface_cutoff);

        Ok(Self {
            params,
            sampler,
            observer: None,
        })

    }

    /// Attach an observer of the noise values compared to the thresholds.
    pub fn with_observer(mut self, observer: Arc<dyn NoiseObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn set_observer(&mut self, observer: Option<Arc<dyn NoiseObserver>>) {
        self.observer = observer;
    }

    #[inline]
    pub fn params(&self) -> &CaveParams {
        &self.params
    }

    /// The sampler, to pre-compute noise columns shared between several passes.
    #[inline]
    pub fn sampler(&self) -> &ColumnNoiseSampler {
        &self.sampler
    }

    /// Altitude where caves start closing off, at least 1. The highest of both surface
    /// estimates is used in case the estimator swapped them.
    #[inline]
    pub fn transition_boundary(&self, span: &ColumnSpan) -> i32 {
        let surface = span.max_surface.max(span.min_surface);
        (surface - self.params.surface_cutoff).max(1)
    }

    /// Compute the threshold table of the given span.
    pub fn thresholds(&self, span: &ColumnSpan) -> ThresholdTable {
        ThresholdTable::generate(
            &self.params.threshold_profile(),
            span.bottom_y,
            span.top_y,
            self.transition_boundary(span))
    }

    /// Sample the noise of the column and carve it. Nothing is done if the column is not
    /// within the chunk or if the span is not within the chunk height.
    pub fn carve_column<B>(&self, buffer: &mut B, pos: ColumnPos, span: ColumnSpan, liquid: u8)
    where
        B: VoxelBuffer + ?Sized,
    {

        if !pos.is_local() || !span.is_valid() {
            trace!("skipping cave column {pos:?} {span:?}");
            return;
        }

        let mut noises = self.sampler.sample(pos, span.bottom_y, span.top_y);
        self.carve_column_with_noise(buffer, pos, span, liquid, &mut noises);

    }

    /// Carve the column with a noise column sampled beforehand, the noise column is
    /// modified by the headroom adjustment. Nothing is done if the column is not within
    /// the chunk, if the span is not within the chunk height, or if the noise column
    /// doesn't cover the span with a tuple per generator.
    pub fn carve_column_with_noise<B>(&self,
        buffer: &mut B,
        pos: ColumnPos,
        span: ColumnSpan,
        liquid: u8,
        noises: &mut NoiseColumn,
    ) where
        B: VoxelBuffer + ?Sized,
    {

        if !pos.is_local() || !span.is_valid() {
            trace!("skipping cave column {pos:?} {span:?}");
            return;
        }

        if noises.width() != self.sampler.width() || !noises.covers(span.bottom_y, span.top_y) {
            trace!("skipping cave column {pos:?}, noise column doesn't match");
            return;
        }

        let transition = self.transition_boundary(&span);
        let thresholds = self.thresholds(&span);

        if let Some(headroom) = &self.params.headroom {
            adjust_headroom(noises, &thresholds, headroom, span.bottom_y, span.top_y);
        }

        self.dig_column(buffer, pos, &span, liquid, noises, &thresholds);

        if !self.params.debug_visualizer {
            self.clean_floating(buffer, pos, &span, transition, liquid);
        }

    }

    /// Return true if every noise value of the tuple at this altitude reaches the
    /// threshold.
    fn should_carve(&self, noises: &NoiseColumn, thresholds: &ThresholdTable, y: i32) -> bool {

        let (Some(tuple), Some(threshold)) = (noises.get(y), thresholds.get(y)) else {
            return false;
        };

        if let Some(observer) = &self.observer {
            observer.observe(tuple.iter().copied().fold(f64::INFINITY, f64::min));
        }

        passes(tuple, threshold)

    }

    /// Carve, or mark in debug visualizer mode, every voxel of the span from top to
    /// bottom.
    fn dig_column<B>(&self,
        buffer: &mut B,
        pos: ColumnPos,
        span: &ColumnSpan,
        liquid: u8,
        noises: &NoiseColumn,
        thresholds: &ThresholdTable,
    ) where
        B: VoxelBuffer + ?Sized,
    {
        for y in (span.bottom_y..=span.top_y).rev() {
            let carve = self.should_carve(noises, thresholds, y);
            let voxel = pos.voxel(y);
            if self.params.debug_visualizer {
                buffer.set_block(voxel, if carve { self.params.debug_block } else { block::AIR });
            } else if carve {
                dig_block(buffer, voxel, liquid, self.params.liquid_altitude);
            }
        }
    }

    /// Dig every carvable voxel between air above and air below in the ramp band, where
    /// the rising threshold leaves isolated voxels behind.
    fn clean_floating<B>(&self,
        buffer: &mut B,
        pos: ColumnPos,
        span: &ColumnSpan,
        transition: i32,
        liquid: u8,
    ) where
        B: VoxelBuffer + ?Sized,
    {

        let start = (transition + 1).max(1);
        let end = span.top_y.min(CHUNK_HEIGHT as i32 - 1);

        for y in start..end {
            let voxel = pos.voxel(y);
            if material::is_carvable(buffer.block(voxel), buffer.block(pos.voxel(y + 1)))
                && buffer.block(pos.voxel(y + 1)) == block::AIR
                && buffer.block(pos.voxel(y - 1)) == block::AIR {
                dig_block(buffer, voxel, liquid, self.params.liquid_altitude);
            }
        }

    }

}


#[cfg(test)]
mod tests {

    use glam::IVec3;

    use super::*;
    use crate::carve::{parameters_for, CarverParameters, CarverStyle, RampCurve, NoiseStats};
    use crate::carve::tests::terrain_chunk;
    use crate::util::{FractalSettings, NoiseKind};
    use crate::chunk::Chunk;

    const POS: ColumnPos = ColumnPos { cx: 0, cz: 0, x: 4, z: 9 };

    /// Parameters with the given generator count, base threshold 0.5, ramp ceiling 0.9,
    /// surface cutoff 10, no headroom adjustment.
    fn params(generators: usize) -> CaveParams {
        let CarverParameters::Cave(mut params) = parameters_for(CarverStyle::Tunnels) else {
            panic!("tunnels should be cave parameters");
        };
        params.generators = vec![FractalSettings { kind: NoiseKind::Perlin, octaves: 1, gain: 0.5, frequency: 0.05 }; generators];
        params.noise_threshold = 0.5;
        params.ramp_ceiling = 0.9;
        params.ramp_curve = RampCurve::Linear;
        params.surface_cutoff = 10;
        params.headroom = None;
        params.liquid_altitude = 10;
        params
    }

    fn uniform(bottom: i32, top: i32, tuple: &[f64]) -> NoiseColumn {
        let tuples = vec![tuple; (top - bottom + 1) as usize];
        NoiseColumn::from_tuples(bottom, &tuples)
    }

    /// Span from 0 to 60 whose transition boundary is 50.
    const SPAN: ColumnSpan = ColumnSpan { bottom_y: 0, top_y: 60, max_surface: 60, min_surface: 55 };

    fn stone_chunk() -> Box<Chunk> {
        let mut chunk = Chunk::new();
        chunk.fill_block(IVec3::ZERO, IVec3::new(16, 100, 16), block::STONE);
        chunk
    }

    #[test]
    fn single_generator_ramp() {

        let carver = CaveCarver::new(0, params(1)).unwrap();
        assert_eq!(carver.transition_boundary(&SPAN), 50);

        let mut chunk = stone_chunk();
        let mut noises = uniform(0, 60, &[0.6]);
        carver.carve_column_with_noise(&mut *chunk, POS, SPAN, block::LAVA_STILL, &mut noises);

        assert_eq!(chunk.block(POS.voxel(30)), block::AIR);
        assert_eq!(chunk.block(POS.voxel(59)), block::STONE);
        // Filled with liquid at and below the liquid altitude.
        assert_eq!(chunk.block(POS.voxel(10)), block::LAVA_STILL);
        assert_eq!(chunk.block(POS.voxel(11)), block::AIR);
        // 0.5 + 0.4 * 2 / 10 = 0.58 still carved, 0.62 is not.
        assert_eq!(chunk.block(POS.voxel(52)), block::AIR);
        assert_eq!(chunk.block(POS.voxel(53)), block::STONE);
        // Neighbor columns are untouched.
        assert_eq!(chunk.block(IVec3::new(5, 30, 9)), block::STONE);

    }

    #[test]
    fn all_generators_must_agree() {

        let carver = CaveCarver::new(0, params(2)).unwrap();
        let mut chunk = stone_chunk();

        let mut tuples = vec![[0.0, 0.0]; 61];
        tuples[20] = [0.7, 0.4];
        tuples[21] = [0.4, 0.7];
        tuples[22] = [0.7, 0.7];
        tuples[23] = [0.5, 0.5];
        let mut noises = NoiseColumn::from_tuples(0, &tuples);

        carver.carve_column_with_noise(&mut *chunk, POS, SPAN, block::LAVA_STILL, &mut noises);

        assert_eq!(chunk.block(POS.voxel(20)), block::STONE);
        assert_eq!(chunk.block(POS.voxel(21)), block::STONE);
        assert_eq!(chunk.block(POS.voxel(22)), block::AIR);
        assert_eq!(chunk.block(POS.voxel(23)), block::AIR);

    }

    #[test]
    fn carve_iff_all_reach_threshold() {

        let carver = CaveCarver::new(0, params(3)).unwrap();
        let thresholds = carver.thresholds(&SPAN);

        let mut rand = crate::util::JavaRandom::new(99);
        let tuples = (0..=60)
            .map(|_| [rand.next_double(), rand.next_double() * 0.5 + 0.5, rand.next_double()])
            .collect::<Vec<_>>();
        let mut noises = NoiseColumn::from_tuples(0, &tuples);

        let mut chunk = stone_chunk();
        carver.carve_column_with_noise(&mut *chunk, POS, SPAN, block::LAVA_STILL, &mut noises);

        // The floating cleaner may only add carved voxels in the ramp band.
        for y in 0..=50 {
            let threshold = thresholds.get(y).unwrap();
            let expected = tuples[y as usize].iter().all(|&n| n >= threshold);
            let carved = chunk.block(POS.voxel(y)) != block::STONE;
            assert_eq!(carved, expected, "y = {y}");
        }

    }

    #[test]
    fn floating_voxels_removed() {

        let carver = CaveCarver::new(0, params(1)).unwrap();
        let mut chunk = stone_chunk();

        // Carved at 54 and 56 only, 55 stays between them.
        let mut tuples = vec![[0.0]; 61];
        tuples[54] = [1.0];
        tuples[56] = [1.0];
        tuples[30] = [1.0];
        tuples[32] = [1.0];
        let mut noises = NoiseColumn::from_tuples(0, &tuples);

        carver.carve_column_with_noise(&mut *chunk, POS, SPAN, block::LAVA_STILL, &mut noises);

        assert_eq!(chunk.block(POS.voxel(54)), block::AIR);
        assert_eq!(chunk.block(POS.voxel(55)), block::AIR);
        assert_eq!(chunk.block(POS.voxel(56)), block::AIR);
        // Below the band, the voxel is kept.
        assert_eq!(chunk.block(POS.voxel(31)), block::STONE);

    }

    #[test]
    fn cleaner_band_limits() {

        let carver = CaveCarver::new(0, params(1)).unwrap();

        // Sandwiched voxels right at the boundary and right at the top are outside the
        // band and must be kept.
        let mut chunk = stone_chunk();
        for y in [49, 51, 59, 61] {
            chunk.set_block(POS.voxel(y), block::AIR);
        }

        let mut noises = uniform(0, 60, &[0.0]);
        carver.carve_column_with_noise(&mut *chunk, POS, SPAN, block::LAVA_STILL, &mut noises);

        assert_eq!(chunk.block(POS.voxel(50)), block::STONE);
        assert_eq!(chunk.block(POS.voxel(60)), block::STONE);

    }

    #[test]
    fn headroom_makes_taller_caves() {

        let mut with_headroom = params(1);
        with_headroom.headroom = Some(crate::carve::HeadroomSettings { first_factor: 0.95, second_factor: 0.5, max_height: 2 });
        let carver = CaveCarver::new(0, with_headroom).unwrap();
        let mut chunk = stone_chunk();

        let mut tuples = vec![[0.0]; 61];
        tuples[20] = [0.6];
        tuples[21] = [0.45];
        tuples[22] = [0.42];
        let mut noises = NoiseColumn::from_tuples(0, &tuples);

        carver.carve_column_with_noise(&mut *chunk, POS, SPAN, block::LAVA_STILL, &mut noises);

        assert_eq!(chunk.block(POS.voxel(20)), block::AIR);
        assert_eq!(chunk.block(POS.voxel(21)), block::AIR);
        assert_eq!(chunk.block(POS.voxel(22)), block::AIR);
        assert_eq!(chunk.block(POS.voxel(23)), block::STONE);

    }

    #[test]
    fn out_of_range_is_noop() {

        let carver = CaveCarver::new(0, params(1)).unwrap();
        let reference = stone_chunk();

        let invalid_positions = [
            (ColumnPos { x: 16, ..POS }, SPAN),
            (ColumnPos { x: -1, ..POS }, SPAN),
            (ColumnPos { z: 16, ..POS }, SPAN),
            (POS, ColumnSpan { bottom_y: -1, ..SPAN }),
            (POS, ColumnSpan { top_y: 256, ..SPAN }),
        ];

        for (pos, span) in invalid_positions {

            let mut chunk = stone_chunk();
            let mut noises = uniform(-1, 256, &[1.0]);
            carver.carve_column_with_noise(&mut *chunk, pos, span, block::LAVA_STILL, &mut noises);
            carver.carve_column(&mut *chunk, pos, span, block::LAVA_STILL);

            for x in 0..16 {
                for z in 0..16 {
                    assert_eq!(chunk.column(x, z), reference.column(x, z));
                }
            }

        }

    }

    #[test]
    fn mismatched_noise_is_noop() {

        let carver = CaveCarver::new(0, params(2)).unwrap();
        let mut chunk = stone_chunk();

        // Wrong width.
        let mut noises = uniform(0, 60, &[1.0]);
        carver.carve_column_with_noise(&mut *chunk, POS, SPAN, block::LAVA_STILL, &mut noises);
        // Not covering the span.
        let mut noises = uniform(10, 60, &[1.0, 1.0]);
        carver.carve_column_with_noise(&mut *chunk, POS, SPAN, block::LAVA_STILL, &mut noises);

        assert!(chunk.column(POS.x, POS.z)[..100].iter().all(|&id| id == block::STONE));

    }

    #[test]
    fn debug_visualizer_marks() {

        let mut debug = params(1);
        debug.debug_visualizer = true;
        debug.debug_block = block::GLASS;
        let carver = CaveCarver::new(0, debug).unwrap();

        let mut chunk = stone_chunk();
        let mut tuples = vec![[0.0]; 61];
        tuples[30] = [0.6];
        tuples[53] = [0.6];
        tuples[55] = [0.6];
        let mut noises = NoiseColumn::from_tuples(0, &tuples);

        carver.carve_column_with_noise(&mut *chunk, POS, SPAN, block::LAVA_STILL, &mut noises);

        assert_eq!(chunk.block(POS.voxel(30)), block::GLASS);
        assert_eq!(chunk.block(POS.voxel(29)), block::AIR);
        // Not carved at 53 in the ramp and the cleaner doesn't run.
        assert_eq!(chunk.block(POS.voxel(53)), block::AIR);
        assert_eq!(chunk.block(POS.voxel(54)), block::AIR);
        // Outside of the span.
        assert_eq!(chunk.block(POS.voxel(61)), block::STONE);

    }

    #[test]
    fn sampled_column_reused() {

        let mut params = params(2);
        params.noise_threshold = -2.0;
        let carver = CaveCarver::new(3, params).unwrap();

        let span = ColumnSpan { bottom_y: 1, top_y: 70, max_surface: 70, min_surface: 70 };
        let sampled = carver.sampler().sample(POS, span.bottom_y, span.top_y);

        let mut chunk = terrain_chunk(70);
        let mut noises = sampled.clone();
        carver.carve_column_with_noise(&mut *chunk, POS, span, block::LAVA_STILL, &mut noises);

        let mut other = terrain_chunk(70);
        carver.carve_column(&mut *other, POS, span, block::LAVA_STILL);

        assert_eq!(chunk.column(POS.x, POS.z), other.column(POS.x, POS.z));
        // Below the transition everything passes a threshold of -2.
        assert!(chunk.column(POS.x, POS.z)[11..=60].iter().all(|&id| id == block::AIR));
        assert_eq!(chunk.column(POS.x, POS.z)[0], block::BEDROCK);

    }

    #[test]
    fn observer_sees_weakest_value() {

        let stats = Arc::new(NoiseStats::new("test", 0));
        let carver = CaveCarver::new(0, params(2)).unwrap().with_observer(stats.clone());

        let mut chunk = stone_chunk();
        let mut noises = NoiseColumn::from_tuples(0, &[[0.3, 0.8], [0.9, 0.1]]);
        let span = ColumnSpan { bottom_y: 0, top_y: 1, max_surface: 90, min_surface: 90 };
        carver.carve_column_with_noise(&mut *chunk, POS, span, block::LAVA_STILL, &mut noises);

        let report = stats.snapshot();
        assert_eq!(report.count, 2);
        assert_eq!(report.min, 0.1);
        assert_eq!(report.max, 0.3);

    }

}
