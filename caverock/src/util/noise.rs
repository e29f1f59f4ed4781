//! Perlin, simplex, cubic, fractal and domain-warp noise generators.

use glam::{DVec2, DVec3};

use super::JavaRandom;


/// Each octave doubles the frequency of the previous one.
const LACUNARITY: f64 = 2.0;


/// A 3D/2D Perlin noise generator.
#[derive(Debug, Clone)]
pub struct PerlinNoise {
    /// All permutations used by Perlin noise algorithm.
    permutations: Box<[u16; 512]>,
    /// Offset applied to all position given to the generator.
    offset: DVec3,
}

impl PerlinNoise {

    /// Create a new perlin noise initialized with the given RNG.
    pub fn new(rand: &mut JavaRandom) -> Self {
        let (permutations, offset) = new_lattice(rand);
        Self {
            permutations,
            offset,
        }
    }

    /// Get the noise value at given 3D coordinates, roughly in [-1, 1].
    pub fn sample_3d(&self, pos: DVec3) -> f64 {

        let mut pos = pos + self.offset;
        let pos_floor = pos.floor();
        pos -= pos_floor;
        let factor = pos * pos * pos * (pos * (pos * 6.0 - 15.0) + 10.0);

        let x_index = lattice_index(pos_floor.x);
        let y_index = lattice_index(pos_floor.y);
        let z_index = lattice_index(pos_floor.z);

        let perm = &self.permutations[..];
        let a = perm[x_index] as usize + y_index;
        let a0 = perm[a] as usize + z_index;
        let a1 = perm[a + 1] as usize + z_index;
        let b = perm[x_index + 1] as usize + y_index;
        let b0 = perm[b] as usize + z_index;
        let b1 = perm[b + 1] as usize + z_index;

        lerp(factor.z,
            lerp(factor.y,
                lerp(factor.x,
                    grad(perm[a0], pos),
                    grad(perm[b0], pos - DVec3::new(1.0, 0.0, 0.0))),
                lerp(factor.x,
                    grad(perm[a1], pos - DVec3::new(0.0, 1.0, 0.0)),
                    grad(perm[b1], pos - DVec3::new(1.0, 1.0, 0.0)))),
            lerp(factor.y,
                lerp(factor.x,
                    grad(perm[a0 + 1], pos - DVec3::new(0.0, 0.0, 1.0)),
                    grad(perm[b0 + 1], pos - DVec3::new(1.0, 0.0, 1.0))),
                lerp(factor.x,
                    grad(perm[a1 + 1], pos - DVec3::new(0.0, 1.0, 1.0)),
                    grad(perm[b1 + 1], pos - DVec3::new(1.0, 1.0, 1.0)))))

    }

}

/// Draw the offset and then the shuffled permutation table of a lattice noise.
fn new_lattice(rand: &mut JavaRandom) -> (Box<[u16; 512]>, DVec3) {

    let offset = rand.next_dvec3() * 256.0;
    let mut permutations = Box::new(std::array::from_fn::<u16, 512, _>(|i| {
        if i <= 256 {
            i as u16
        } else {
            0
        }
    }));

    for index in 0usize..256 {
        let permutation_index = rand.next_int_bounded(256 - index as i32) as usize + index;
        permutations.swap(index, permutation_index);
        permutations[index + 256] = permutations[index];
    }

    (permutations, offset)

}

/// Wrapping through i64 keeps huge coordinates well defined.
#[inline]
fn lattice_index(value: f64) -> usize {
    (value as i64 & 255) as usize
}

#[inline]
fn lerp(factor: f64, from: f64, to: f64) -> f64 {
    from + factor * (to - from)
}

#[inline]
fn grad(value: u16, pos: DVec3) -> f64 {
    let value = value & 15;
    let a = if value < 8 { pos.x } else { pos.y };
    let b = if value < 4 { pos.y } else if value != 12 && value != 14 { pos.z } else { pos.x };
    (if value & 1 == 0 { a } else { -a }) + (if value & 2 == 0 { b } else { -b })
}


/// Skew factor from the input space to the simplex grid.
const SIMPLEX_SKEW: f64 = 1.0 / 3.0;
/// Unskew factor from the simplex grid back to the input space.
const SIMPLEX_UNSKEW: f64 = 1.0 / 6.0;

/// Gradients toward the middle of each edge of a cube.
const SIMPLEX_GRADIENTS: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0], [-1.0, 1.0, 0.0], [1.0, -1.0, 0.0], [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0], [-1.0, 0.0, 1.0], [1.0, 0.0, -1.0], [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0], [0.0, -1.0, 1.0], [0.0, 1.0, -1.0], [0.0, -1.0, -1.0],
];


/// A 3D simplex noise generator, gradients are summed over the four corners of the
/// tetrahedron containing the point.
#[derive(Debug, Clone)]
pub struct SimplexNoise {
    permutations: Box<[u16; 512]>,
    offset: DVec3,
}

impl SimplexNoise {

    /// Create a new simplex noise initialized with the given RNG.
    pub fn new(rand: &mut JavaRandom) -> Self {
        let (permutations, offset) = new_lattice(rand);
        Self {
            permutations,
            offset,
        }
    }

    /// Get the noise value at given 3D coordinates, roughly in [-1, 1].
    pub fn sample_3d(&self, pos: DVec3) -> f64 {

        let pos = pos + self.offset;
        let cell = (pos + (pos.x + pos.y + pos.z) * SIMPLEX_SKEW).floor();
        let origin = cell - (cell.x + cell.y + cell.z) * SIMPLEX_UNSKEW;
        let rel = pos - origin;

        // Second and third corners, ordered by decreasing relative coordinate.
        let (second, third) = if rel.x >= rel.y {
            if rel.y >= rel.z {
                (DVec3::X, DVec3::new(1.0, 1.0, 0.0))
            } else if rel.x >= rel.z {
                (DVec3::X, DVec3::new(1.0, 0.0, 1.0))
            } else {
                (DVec3::Z, DVec3::new(1.0, 0.0, 1.0))
            }
        } else if rel.y < rel.z {
            (DVec3::Z, DVec3::new(0.0, 1.0, 1.0))
        } else if rel.x < rel.z {
            (DVec3::Y, DVec3::new(0.0, 1.0, 1.0))
        } else {
            (DVec3::Y, DVec3::new(1.0, 1.0, 0.0))
        };

        let x_index = lattice_index(cell.x);
        let y_index = lattice_index(cell.y);
        let z_index = lattice_index(cell.z);
        let perm = &self.permutations[..];

        let mut ret = 0.0;
        for (i, corner) in [DVec3::ZERO, second, third, DVec3::ONE].into_iter().enumerate() {

            let dist = rel - corner + i as f64 * SIMPLEX_UNSKEW;
            let falloff = 0.6 - dist.length_squared();
            if falloff <= 0.0 {
                continue;
            }

            let hash = perm[x_index + corner.x as usize
                + perm[y_index + corner.y as usize
                    + perm[z_index + corner.z as usize] as usize] as usize];

            let [gx, gy, gz] = SIMPLEX_GRADIENTS[hash as usize % 12];
            let falloff = falloff * falloff;
            ret += falloff * falloff * (gx * dist.x + gy * dist.y + gz * dist.z);

        }

        32.0 * ret

    }

}


/// Scale bringing the overshoot of three nested cubic interpolations back near [-1, 1].
const CUBIC_BOUNDING: f64 = 1.0 / (1.5 * 1.5 * 1.5);


/// A 3D value noise generator with cubic interpolation between the random values of the
/// 4x4x4 lattice points surrounding the point.
#[derive(Debug, Clone)]
pub struct CubicNoise {
    permutations: Box<[u16; 512]>,
    offset: DVec3,
}

impl CubicNoise {

    /// Create a new cubic noise initialized with the given RNG.
    pub fn new(rand: &mut JavaRandom) -> Self {
        let (permutations, offset) = new_lattice(rand);
        Self {
            permutations,
            offset,
        }
    }

    /// Random value in [-1, 1] of a lattice point.
    #[inline]
    fn value(&self, x: i64, y: i64, z: i64) -> f64 {
        let perm = &self.permutations[..];
        let hash = perm[perm[perm[(x & 255) as usize] as usize + (y & 255) as usize] as usize + (z & 255) as usize];
        hash as f64 / 127.5 - 1.0
    }

    /// Get the noise value at given 3D coordinates, roughly in [-1, 1].
    pub fn sample_3d(&self, pos: DVec3) -> f64 {

        let pos = pos + self.offset;
        let pos_floor = pos.floor();
        let factor = pos - pos_floor;
        let (x, y, z) = (pos_floor.x as i64, pos_floor.y as i64, pos_floor.z as i64);

        let planes = [-1, 0, 1, 2].map(|dz| {
            let rows = [-1, 0, 1, 2].map(|dy| {
                let [a, b, c, d] = [-1, 0, 1, 2].map(|dx| self.value(x + dx, y + dy, z + dz));
                cubic_lerp(factor.x, a, b, c, d)
            });
            cubic_lerp(factor.y, rows[0], rows[1], rows[2], rows[3])
        });

        cubic_lerp(factor.z, planes[0], planes[1], planes[2], planes[3]) * CUBIC_BOUNDING

    }

}

/// Interpolate between `b` and `c`, the outer values `a` and `d` shape the curve.
#[inline]
fn cubic_lerp(factor: f64, a: f64, b: f64, c: f64, d: f64) -> f64 {
    let p = (d - c) - (a - b);
    factor * factor * factor * p + factor * factor * ((a - b) - p) + factor * (c - a) + b
}


/// The base noise summed by each octave of a fractal field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseKind {
    #[default]
    Perlin,
    Simplex,
    Cubic,
}


/// A single octave of a fractal field.
#[derive(Debug, Clone)]
enum Octave {
    Perlin(PerlinNoise),
    Simplex(SimplexNoise),
    Cubic(CubicNoise),
}

impl Octave {

    fn new(rand: &mut JavaRandom, kind: NoiseKind) -> Self {
        match kind {
            NoiseKind::Perlin => Self::Perlin(PerlinNoise::new(rand)),
            NoiseKind::Simplex => Self::Simplex(SimplexNoise::new(rand)),
            NoiseKind::Cubic => Self::Cubic(CubicNoise::new(rand)),
        }
    }

    #[inline]
    fn sample_3d(&self, pos: DVec3) -> f64 {
        match self {
            Self::Perlin(noise) => noise.sample_3d(pos),
            Self::Simplex(noise) => noise.sample_3d(pos),
            Self::Cubic(noise) => noise.sample_3d(pos),
        }
    }

}


/// Noise kind, octave count, gain and base frequency of a fractal noise field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalSettings {
    pub kind: NoiseKind,
    pub octaves: u8,
    /// Amplitude multiplier between two consecutive octaves.
    pub gain: f64,
    /// Frequency of the first octave.
    pub frequency: f64,
}


/// A fractal sum of noise octaves, normalized by the sum of the octave amplitudes so
/// that the output keeps the range of a single octave whatever the gain.
#[derive(Debug, Clone)]
pub struct FractalNoise {
    /// One generator per octave, from the lowest frequency to the highest.
    octaves: Box<[Octave]>,
    frequency: f64,
    gain: f64,
    /// Inverse of the sum of all octave amplitudes.
    bounding: f64,
}

impl FractalNoise {

    /// Create a fractal noise field, consuming one permutation table per octave from
    /// the given RNG. At least one octave is always generated.
    pub fn new(rand: &mut JavaRandom, settings: &FractalSettings) -> Self {

        let count = settings.octaves.max(1) as usize;

        let mut amplitude = 1.0;
        let mut total = 0.0;
        for _ in 0..count {
            total += amplitude;
            amplitude *= settings.gain;
        }

        Self {
            octaves: (0..count)
                .map(|_| Octave::new(rand, settings.kind))
                .collect::<Vec<_>>()
                .into_boxed_slice(),
            frequency: settings.frequency,
            gain: settings.gain,
            bounding: if total > 0.0 { 1.0 / total } else { 1.0 },
        }

    }

    /// Get the fractal noise value at given 3D coordinates.
    pub fn sample_3d(&self, pos: DVec3) -> f64 {
        let mut pos = pos * self.frequency;
        let mut amplitude = 1.0;
        let mut ret = 0.0;
        for octave in &self.octaves[..] {
            ret += octave.sample_3d(pos) * amplitude;
            pos *= LACUNARITY;
            amplitude *= self.gain;
        }
        ret * self.bounding
    }

    /// Get the fractal noise value at given 2D coordinates, the vertical axis of the
    /// underlying 3D field is fixed at zero.
    pub fn sample_2d(&self, pos: DVec2) -> f64 {
        self.sample_3d(DVec3::new(pos.x, 0.0, pos.y))
    }

}


/// Fractal settings of a turbulence field plus the maximum displacement it applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurbulenceSettings {
    pub fractal: FractalSettings,
    /// Displacement, in input units, for a unit noise value.
    pub amplitude: f64,
}


/// A domain warp: three independent fractal fields displace each axis of the position
/// before it is fed to the primary noise.
#[derive(Debug, Clone)]
pub struct Turbulence {
    axes: [FractalNoise; 3],
    amplitude: f64,
}

impl Turbulence {

    pub fn new(rand: &mut JavaRandom, settings: &TurbulenceSettings) -> Self {
        Self {
            axes: [
                FractalNoise::new(rand, &settings.fractal),
                FractalNoise::new(rand, &settings.fractal),
                FractalNoise::new(rand, &settings.fractal),
            ],
            amplitude: settings.amplitude,
        }
    }

    /// Return the displaced position.
    pub fn perturb(&self, pos: DVec3) -> DVec3 {
        let [x, y, z] = &self.axes;
        pos + DVec3::new(x.sample_3d(pos), y.sample_3d(pos), z.sample_3d(pos)) * self.amplitude
    }

}
