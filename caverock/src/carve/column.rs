//! Noise tuples of a column and the sampler producing them.

use glam::DVec3;

use crate::util::{JavaRandom, FractalNoise, FractalSettings, Turbulence, TurbulenceSettings};

use super::ColumnPos;


/// The noise tuples of every altitude of a column, from bottom to top inclusive. A
/// tuple holds one value per generator, all tuples are stored contiguously.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseColumn {
    bottom: i32,
    /// Number of values in each tuple.
    width: usize,
    values: Vec<f64>,
}

impl NoiseColumn {

    /// Create a column of tuples filled with zeros.
    pub fn new(bottom: i32, top: i32, width: usize) -> Self {
        let height = (top - bottom + 1).max(0) as usize;
        Self {
            bottom,
            width,
            values: vec![0.0; height * width],
        }
    }

    /// Create a column from the given tuples, the first one is at the bottom altitude.
    /// Panics if all tuples don't have the same length.
    pub fn from_tuples<T: AsRef<[f64]>>(bottom: i32, tuples: &[T]) -> Self {
        let width = tuples.first().map(|t| t.as_ref().len()).unwrap_or(0);
        let mut values = Vec::with_capacity(width * tuples.len());
        for tuple in tuples {
            let tuple = tuple.as_ref();
            assert_eq!(tuple.len(), width, "all tuples must have the same length");
            values.extend_from_slice(tuple);
        }
        Self { bottom, width, values }
    }

    /// Lowest altitude of the column.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    /// Highest altitude of the column, below the bottom if the column is empty.
    #[inline]
    pub fn top(&self) -> i32 {
        self.bottom + self.height() as i32 - 1
    }

    /// Number of altitudes in the column.
    #[inline]
    pub fn height(&self) -> usize {
        if self.width == 0 { 0 } else { self.values.len() / self.width }
    }

    /// Number of noise values per tuple.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Return true if the column has a tuple for every altitude of `bottom..=top`.
    #[inline]
    pub fn covers(&self, bottom: i32, top: i32) -> bool {
        bottom >= self.bottom && top <= self.top()
    }

    #[inline]
    fn range(&self, y: i32) -> Option<std::ops::Range<usize>> {
        let index = usize::try_from(y - self.bottom).ok()?;
        if index >= self.height() {
            return None;
        }
        let start = index * self.width;
        Some(start..start + self.width)
    }

    /// Get the tuple at the given altitude.
    #[inline]
    pub fn get(&self, y: i32) -> Option<&[f64]> {
        self.range(y).map(|range| &self.values[range])
    }

    /// Get the mutable tuple at the given altitude.
    #[inline]
    pub fn get_mut(&mut self, y: i32) -> Option<&mut [f64]> {
        self.range(y).map(|range| &mut self.values[range])
    }

    /// Get the tuples at two different altitudes, the first one mutable.
    pub(super) fn get_mut_and_ref(&mut self, y_mut: i32, y_ref: i32) -> Option<(&mut [f64], &[f64])> {
        let range_mut = self.range(y_mut)?;
        let range_ref = self.range(y_ref)?;
        if range_mut.start == range_ref.start {
            return None;
        }
        if range_mut.start < range_ref.start {
            let (low, high) = self.values.split_at_mut(range_ref.start);
            Some((&mut low[range_mut], &high[..self.width]))
        } else {
            let (low, high) = self.values.split_at_mut(range_mut.start);
            Some((&mut high[..self.width], &low[range_ref]))
        }
    }

}


/// Samples the noise generators of a cave carver for whole columns.
#[derive(Debug, Clone)]
pub struct ColumnNoiseSampler {
    generators: Box<[FractalNoise]>,
    turbulence: Option<Turbulence>,
    y_compression: f64,
    xz_compression: f64,
}

impl ColumnNoiseSampler {

    /// Build the generators from the given seed, each generator and the turbulence get
    /// their own RNG stream forked from the seed.
    pub fn new(
        seed: i64,
        generators: &[FractalSettings],
        turbulence: Option<&TurbulenceSettings>,
        y_compression: f64,
        xz_compression: f64,
    ) -> Self {

        let mut rand = JavaRandom::new(seed);

        Self {
            generators: generators.iter()
                .map(|settings| FractalNoise::new(&mut rand.fork(), settings))
                .collect::<Vec<_>>()
                .into_boxed_slice(),
            turbulence: turbulence.map(|settings| Turbulence::new(&mut rand.fork(), settings)),
            y_compression,
            xz_compression,
        }

    }

    /// Number of generators, and therefore length of the sampled tuples.
    #[inline]
    pub fn width(&self) -> usize {
        self.generators.len()
    }

    /// Sample the tuple of a single voxel.
    pub fn sample_voxel(&self, wx: i32, y: i32, wz: i32, tuple: &mut [f64]) {

        let mut pos = DVec3::new(
            wx as f64 * self.xz_compression,
            y as f64 * self.y_compression,
            wz as f64 * self.xz_compression,
        );

        if let Some(turbulence) = &self.turbulence {
            pos = turbulence.perturb(pos);
        }

        for (value, generator) in tuple.iter_mut().zip(&self.generators[..]) {
            *value = generator.sample_3d(pos);
        }

    }

    /// Sample the tuples of the given column for all altitudes in `bottom..=top`.
    pub fn sample(&self, pos: ColumnPos, bottom: i32, top: i32) -> NoiseColumn {

        let mut column = NoiseColumn::new(bottom, top, self.width());
        let (wx, wz) = (pos.world_x(), pos.world_z());

        for y in bottom..=top {
            if let Some(tuple) = column.get_mut(y) {
                self.sample_voxel(wx, y, wz, tuple);
            }
        }

        column

    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::util::NoiseKind;

    const SETTINGS: FractalSettings = FractalSettings {
        kind: NoiseKind::Perlin,
        octaves: 2,
        gain: 0.5,
        frequency: 0.05,
    };

    #[test]
    fn column_access() {

        let mut column = NoiseColumn::from_tuples(10, &[[0.1, 0.2], [0.3, 0.4], [0.5, 0.6]]);
        assert_eq!(column.bottom(), 10);
        assert_eq!(column.top(), 12);
        assert_eq!(column.width(), 2);
        assert_eq!(column.get(11), Some(&[0.3, 0.4][..]));
        assert_eq!(column.get(9), None);
        assert_eq!(column.get(13), None);
        assert!(column.covers(10, 12));
        assert!(!column.covers(9, 12));

        column.get_mut(12).unwrap()[0] = 1.0;
        assert_eq!(column.get(12), Some(&[1.0, 0.6][..]));

        let (above, below) = column.get_mut_and_ref(11, 10).unwrap();
        above.copy_from_slice(below);
        assert_eq!(column.get(11), Some(&[0.1, 0.2][..]));
        let (below, above) = column.get_mut_and_ref(10, 12).unwrap();
        below.copy_from_slice(above);
        assert_eq!(column.get(10), Some(&[1.0, 0.6][..]));
        assert!(column.get_mut_and_ref(10, 10).is_none());

    }

    #[test]
    fn empty_column() {
        let column = NoiseColumn::new(20, 19, 3);
        assert_eq!(column.height(), 0);
        assert_eq!(column.get(20), None);
        assert!(column.covers(20, 19));
    }

    #[test]
    fn sample_matches_voxels() {

        let turbulence = TurbulenceSettings { fractal: SETTINGS, amplitude: 2.0 };
        let sampler = ColumnNoiseSampler::new(5, &[SETTINGS; 3], Some(&turbulence), 2.0, 0.5);
        let pos = ColumnPos { cx: -2, cz: 3, x: 7, z: 12 };

        let column = sampler.sample(pos, 4, 40);
        assert_eq!(column.width(), 3);
        assert_eq!(column.height(), 37);

        let mut tuple = [0.0; 3];
        for y in [4, 17, 40] {
            sampler.sample_voxel(pos.world_x(), y, pos.world_z(), &mut tuple);
            assert_eq!(column.get(y), Some(&tuple[..]));
        }

        // Independent generators are expected to disagree somewhere.
        assert!((4..=40).any(|y| {
            let tuple = column.get(y).unwrap();
            tuple[0] != tuple[1]
        }));

    }

    #[test]
    fn compression_scales_coordinates() {

        let compressed = ColumnNoiseSampler::new(21, &[SETTINGS; 2], None, 2.0, 0.5);
        let plain = ColumnNoiseSampler::new(21, &[SETTINGS; 2], None, 1.0, 1.0);
        let pos = ColumnPos { cx: -2, cz: 3, x: 4, z: 10 };
        assert_eq!((pos.world_x(), pos.world_z()), (-28, 58));

        let column = compressed.sample(pos, 1, 60);
        let mut tuple = [0.0; 2];
        for y in [1, 2, 13, 30, 60] {
            plain.sample_voxel(-14, y * 2, 29, &mut tuple);
            assert_eq!(column.get(y), Some(&tuple[..]), "y = {y}");
        }

    }

}
