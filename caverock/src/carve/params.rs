//! Immutable carver parameters and the default tunables of every carver style.

use thiserror::Error;

use crate::chunk::CHUNK_HEIGHT;
use crate::util::{FractalSettings, NoiseKind, TurbulenceSettings};
use crate::block;

use super::threshold::{RampCurve, ThresholdProfile};


/// The styles of carving known to [`parameters_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarverStyle {
    /// Long winding tunnels from two low frequency fields.
    Tunnels,
    /// Shorter and wider rooms, strongly warped.
    Chambers,
    /// Large uniform caverns in the lower part of the world.
    Caverns,
}

/// Parameters of one carver, either column based caves or per-voxel caverns.
#[derive(Debug, Clone, PartialEq)]
pub enum CarverParameters {
    Cave(CaveParams),
    Cavern(CavernParams),
}

/// Parameters of the headroom adjustment pass, factors are interpolation weights
/// toward the tuple of the carved voxel, between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadroomSettings {
    /// Weight used to extend a carved space that is one voxel tall.
    pub first_factor: f64,
    /// Weight used to extend a carved space that is two voxels tall or more.
    pub second_factor: f64,
    /// Carved spaces taller than this are never extended, at least 1.
    pub max_height: i32,
}

/// Parameters of a column based cave carver.
#[derive(Debug, Clone, PartialEq)]
pub struct CaveParams {
    /// One entry per noise generator, a voxel is carved only if all of them agree.
    pub generators: Vec<FractalSettings>,
    /// Domain warp applied once per voxel before sampling all generators.
    pub turbulence: Option<TurbulenceSettings>,
    /// Factor applied to the altitude before sampling, above 1 squashes caves.
    pub y_compression: f64,
    /// Factor applied to the horizontal coordinates before sampling.
    pub xz_compression: f64,
    /// Threshold every noise value must reach below the transition boundary.
    pub noise_threshold: f64,
    /// Threshold reached at the top of the column.
    pub ramp_ceiling: f64,
    pub ramp_curve: RampCurve,
    /// Distance below the surface where caves start closing off.
    pub surface_cutoff: i32,
    /// Headroom adjustment, disabled when none.
    pub headroom: Option<HeadroomSettings>,
    /// Carved voxels at or below this altitude are filled with liquid.
    pub liquid_altitude: i32,
    /// Mark voxels instead of carving them.
    pub debug_visualizer: bool,
    /// Block placed on voxels that would be carved in debug visualizer mode.
    pub debug_block: u8,
}

/// Parameters of the per-voxel cavern carver.
#[derive(Debug, Clone, PartialEq)]
pub struct CavernParams {
    /// Settings shared by the two multiplied fields.
    pub fractal: FractalSettings,
    /// Domain warp applied before sampling both fields.
    pub turbulence: Option<TurbulenceSettings>,
    /// Threshold the product of both fields must exceed.
    pub noise_threshold: f64,
    /// Highest altitude a cavern can reach.
    pub top_y: i32,
    /// Carved voxels at or below this altitude are filled with liquid.
    pub liquid_altitude: i32,
    /// Mark voxels instead of carving them.
    pub debug_visualizer: bool,
    /// Block placed on voxels that would be carved in debug visualizer mode.
    pub debug_block: u8,
}

/// Return the default parameters of the given style, the returned structure can be
/// tweaked before building a carver from it.
pub fn parameters_for(style: CarverStyle) -> CarverParameters {
    match style {
        CarverStyle::Tunnels => CarverParameters::Cave(CaveParams {
            generators: vec![FractalSettings { kind: NoiseKind::Cubic, octaves: 1, gain: 0.3, frequency: 0.025 }; 2],
            turbulence: Some(TurbulenceSettings {
                fractal: FractalSettings { kind: NoiseKind::Perlin, octaves: 3, gain: 1.0, frequency: 0.03 },
                amplitude: 2.2,
            }),
            y_compression: 2.2,
            xz_compression: 0.9,
            noise_threshold: 0.35,
            ramp_ceiling: 1.0,
            ramp_curve: RampCurve::Linear,
            surface_cutoff: 10,
            headroom: Some(HeadroomSettings { first_factor: 0.95, second_factor: 0.5, max_height: 2 }),
            liquid_altitude: 10,
            debug_visualizer: false,
            debug_block: block::GLASS,
        }),
        CarverStyle::Chambers => CarverParameters::Cave(CaveParams {
            generators: vec![FractalSettings { kind: NoiseKind::Simplex, octaves: 1, gain: 0.3, frequency: 0.03 }; 2],
            turbulence: Some(TurbulenceSettings {
                fractal: FractalSettings { kind: NoiseKind::Perlin, octaves: 3, gain: 0.5, frequency: 0.05 },
                amplitude: 4.0,
            }),
            y_compression: 2.2,
            xz_compression: 0.9,
            noise_threshold: 0.4,
            ramp_ceiling: 1.0,
            ramp_curve: RampCurve::EaseIn,
            surface_cutoff: 10,
            headroom: Some(HeadroomSettings { first_factor: 0.95, second_factor: 0.5, max_height: 2 }),
            liquid_altitude: 10,
            debug_visualizer: false,
            debug_block: block::GLASS,
        }),
        CarverStyle::Caverns => CarverParameters::Cavern(CavernParams {
            fractal: FractalSettings { kind: NoiseKind::Perlin, octaves: 1, gain: 0.3, frequency: 0.01 },
            turbulence: Some(TurbulenceSettings {
                fractal: FractalSettings { kind: NoiseKind::Perlin, octaves: 3, gain: 1.0, frequency: 0.02 },
                amplitude: 2.2,
            }),
            noise_threshold: 0.15,
            top_y: 64,
            liquid_altitude: 10,
            debug_visualizer: false,
            debug_block: block::WOOL,
        }),
    }
}

impl CarverParameters {

    pub fn validate(&self) -> Result<(), ParamsError> {
        match self {
            CarverParameters::Cave(params) => params.validate(),
            CarverParameters::Cavern(params) => params.validate(),
        }
    }

}

impl CaveParams {

    /// Check that these parameters can build a carver.
    pub fn validate(&self) -> Result<(), ParamsError> {

        if self.generators.is_empty() {
            return Err(ParamsError::NoGenerators);
        }

        for settings in &self.generators {
            validate_fractal(settings)?;
        }

        if let Some(turbulence) = &self.turbulence {
            validate_fractal(&turbulence.fractal)?;
        }

        for compression in [self.y_compression, self.xz_compression] {
            if !compression.is_finite() || compression <= 0.0 {
                return Err(ParamsError::InvalidCompression(compression));
            }
        }

        if !self.noise_threshold.is_finite() {
            return Err(ParamsError::InvalidThreshold(self.noise_threshold));
        }

        // NaN ceilings are rejected here as well.
        if !(self.ramp_ceiling > self.noise_threshold) {
            return Err(ParamsError::FlatRamp {
                threshold: self.noise_threshold,
                ceiling: self.ramp_ceiling,
            });
        }

        if self.surface_cutoff < 0 {
            return Err(ParamsError::NegativeSurfaceCutoff(self.surface_cutoff));
        }

        if let Some(headroom) = &self.headroom {
            for factor in [headroom.first_factor, headroom.second_factor] {
                if !(0.0..=1.0).contains(&factor) {
                    return Err(ParamsError::InvalidHeadroomFactor(factor));
                }
            }
            if headroom.max_height < 1 {
                return Err(ParamsError::InvalidHeadroomHeight(headroom.max_height));
            }
        }

        validate_altitude(self.liquid_altitude)

    }

    /// The altitude profile of the threshold described by these parameters.
    #[inline]
    pub fn threshold_profile(&self) -> ThresholdProfile {
        ThresholdProfile {
            base: self.noise_threshold,
            ceiling: self.ramp_ceiling,
            curve: self.ramp_curve,
        }
    }

}

impl CavernParams {

    /// Check that these parameters can build a carver.
    pub fn validate(&self) -> Result<(), ParamsError> {

        validate_fractal(&self.fractal)?;

        if let Some(turbulence) = &self.turbulence {
            validate_fractal(&turbulence.fractal)?;
        }

        if !self.noise_threshold.is_finite() {
            return Err(ParamsError::InvalidThreshold(self.noise_threshold));
        }

        if self.top_y < 1 || self.top_y >= CHUNK_HEIGHT as i32 {
            return Err(ParamsError::InvalidCavernTop(self.top_y));
        }

        validate_altitude(self.liquid_altitude)

    }

}

fn validate_fractal(settings: &FractalSettings) -> Result<(), ParamsError> {
    if settings.octaves == 0 {
        Err(ParamsError::ZeroOctaves)
    } else if !settings.frequency.is_finite() || settings.frequency <= 0.0 {
        Err(ParamsError::InvalidFrequency(settings.frequency))
    } else if !settings.gain.is_finite() {
        Err(ParamsError::InvalidGain(settings.gain))
    } else {
        Ok(())
    }
}

fn validate_altitude(altitude: i32) -> Result<(), ParamsError> {
    if altitude < 0 || altitude >= CHUNK_HEIGHT as i32 {
        Err(ParamsError::InvalidLiquidAltitude(altitude))
    } else {
        Ok(())
    }
}


/// Error returned when carver parameters cannot produce a working carver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("at least one noise generator is required")]
    NoGenerators,
    #[error("fractal noise needs at least one octave")]
    ZeroOctaves,
    #[error("frequency must be finite and positive, got {0}")]
    InvalidFrequency(f64),
    #[error("fractal gain must be finite, got {0}")]
    InvalidGain(f64),
    #[error("compression must be finite and positive, got {0}")]
    InvalidCompression(f64),
    #[error("noise threshold must be finite, got {0}")]
    InvalidThreshold(f64),
    #[error("ramp ceiling ({ceiling}) must be above the noise threshold ({threshold})")]
    FlatRamp { threshold: f64, ceiling: f64 },
    #[error("surface cutoff must not be negative, got {0}")]
    NegativeSurfaceCutoff(i32),
    #[error("headroom factors must be between 0 and 1, got {0}")]
    InvalidHeadroomFactor(f64),
    #[error("headroom maximum height must be at least 1, got {0}")]
    InvalidHeadroomHeight(i32),
    #[error("liquid altitude must be between 0 and 255, got {0}")]
    InvalidLiquidAltitude(i32),
    #[error("cavern top must be between 1 and 255, got {0}")]
    InvalidCavernTop(i32),
}


#[cfg(test)]
mod tests {

    use super::*;

    fn tunnels() -> CaveParams {
        match parameters_for(CarverStyle::Tunnels) {
            CarverParameters::Cave(params) => params,
            CarverParameters::Cavern(_) => panic!("tunnels should be cave parameters"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        for style in [CarverStyle::Tunnels, CarverStyle::Chambers, CarverStyle::Caverns] {
            assert_eq!(parameters_for(style).validate(), Ok(()), "{style:?}");
        }
        assert!(matches!(parameters_for(CarverStyle::Caverns), CarverParameters::Cavern(_)));
    }

    #[test]
    fn cave_styles_noise_kinds() {
        assert!(tunnels().generators.iter().all(|settings| settings.kind == NoiseKind::Cubic));
        let CarverParameters::Cave(chambers) = parameters_for(CarverStyle::Chambers) else {
            panic!("chambers should be cave parameters");
        };
        assert!(chambers.generators.iter().all(|settings| settings.kind == NoiseKind::Simplex));
    }

    #[test]
    fn invalid_cave() {

        let mut params = tunnels();
        params.generators.clear();
        assert_eq!(params.validate(), Err(ParamsError::NoGenerators));

        let mut params = tunnels();
        params.generators[1].octaves = 0;
        assert_eq!(params.validate(), Err(ParamsError::ZeroOctaves));

        let mut params = tunnels();
        params.xz_compression = 0.0;
        assert_eq!(params.validate(), Err(ParamsError::InvalidCompression(0.0)));

        let mut params = tunnels();
        params.ramp_ceiling = params.noise_threshold;
        assert!(matches!(params.validate(), Err(ParamsError::FlatRamp { .. })));

        let mut params = tunnels();
        params.surface_cutoff = -1;
        assert_eq!(params.validate(), Err(ParamsError::NegativeSurfaceCutoff(-1)));

        let mut params = tunnels();
        params.headroom = Some(HeadroomSettings { first_factor: 1.5, second_factor: 0.5, max_height: 2 });
        assert_eq!(params.validate(), Err(ParamsError::InvalidHeadroomFactor(1.5)));

        let mut params = tunnels();
        params.headroom = Some(HeadroomSettings { first_factor: 0.95, second_factor: 0.5, max_height: 0 });
        assert_eq!(params.validate(), Err(ParamsError::InvalidHeadroomHeight(0)));

        let mut params = tunnels();
        params.liquid_altitude = 256;
        assert_eq!(params.validate(), Err(ParamsError::InvalidLiquidAltitude(256)));

    }

    #[test]
    fn invalid_cavern() {
        let CarverParameters::Cavern(mut params) = parameters_for(CarverStyle::Caverns) else {
            panic!("caverns should be cavern parameters");
        };
        params.top_y = 0;
        assert_eq!(params.validate(), Err(ParamsError::InvalidCavernTop(0)));
        params.top_y = 64;
        params.fractal.frequency = f64::NAN;
        assert!(matches!(params.validate(), Err(ParamsError::InvalidFrequency(_))));
    }

}
