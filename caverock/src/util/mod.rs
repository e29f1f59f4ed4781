//! Random and noise utilities.

mod rand;
mod noise;

pub use rand::JavaRandom;
pub use noise::{PerlinNoise, SimplexNoise, CubicNoise, NoiseKind, FractalNoise, FractalSettings};
pub use noise::{Turbulence, TurbulenceSettings};
