//! Carves a square of synthetic chunks and prints a vertical cross-section of them.

use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use glam::{DVec2, IVec3};
use tracing::{debug, error, info};

use caverock::carve::{parameters_for, CarverParameters, CarverStyle, ChunkCarver, NoiseStats};
use caverock::chunk::{Chunk, VoxelBuffer};
use caverock::util::{FractalNoise, FractalSettings, JavaRandom, NoiseKind};
use caverock::pool::CarvePool;
use caverock::block;

pub mod config;


/// Sea level of the synthetic terrain.
const SEA_LEVEL: i32 = 62;
/// Highest altitude printed in the cross-section.
const SECTION_TOP: i32 = 90;
/// Local Z coordinate of the cross-section.
const SECTION_Z: i32 = 8;


pub fn main() -> ExitCode {

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    let seed = config::seed();
    let chunks = config::chunks() as i32;
    let debug_visualizer = config::debug_visualizer();

    info!("carving {chunks}x{chunks} chunks with seed {seed} on {} workers", config::workers());
    if debug_visualizer {
        info!("debug visualizer enabled, carved voxels are marked with {} and {}",
            block::name(block::GLASS), block::name(block::WOOL));
    }

    let params = [CarverStyle::Tunnels, CarverStyle::Chambers, CarverStyle::Caverns]
        .into_iter()
        .map(|style| {
            let mut params = parameters_for(style);
            match &mut params {
                CarverParameters::Cave(params) => params.debug_visualizer = debug_visualizer,
                CarverParameters::Cavern(params) => params.debug_visualizer = debug_visualizer,
            }
            params
        });

    let stats = Arc::new(NoiseStats::new("carving", 1_000_000));
    let carver = match ChunkCarver::from_parameters(seed, params, config::liquid()) {
        Ok(carver) => carver.observed_by(stats.clone()),
        Err(e) => {
            error!("invalid carver parameters: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut pool = match CarvePool::new(Arc::new(carver), config::workers()) {
        Ok(pool) => pool,
        Err(e) => {
            error!("failed to start carving workers: {e}");
            return ExitCode::FAILURE;
        }
    };

    let terrain = Terrain::new(seed);
    let start = Instant::now();
    let mut carved = HashMap::new();

    for cx in 0..chunks {
        for cz in 0..chunks {
            let mut chunk = terrain.generate(cx, cz);
            // Wait for carved chunks to free the queue.
            while let Err(back) = pool.request(cx, cz, chunk) {
                chunk = back;
                if let Some(done) = pool.wait() {
                    debug!("chunk {}/{} carved in {:?}", done.cx, done.cz, done.duration);
                    carved.insert((done.cx, done.cz), done.chunk);
                }
            }
        }
    }

    while let Some(done) = pool.wait() {
        debug!("chunk {}/{} carved in {:?}", done.cx, done.cz, done.duration);
        carved.insert((done.cx, done.cz), done.chunk);
    }

    info!("carved {} chunks in {:?}", carved.len(), start.elapsed());

    print_section(&carved, chunks);

    let report = stats.reset();
    info!("noise over {} samples: average {:.4}, min {:.4}, max {:.4}",
        report.count, report.average, report.min, report.max);

    ExitCode::SUCCESS

}


/// A simple height map terrain, with water below sea level.
struct Terrain {
    height: FractalNoise,
}

impl Terrain {

    fn new(seed: i64) -> Self {
        let settings = FractalSettings { kind: NoiseKind::Perlin, octaves: 4, gain: 0.5, frequency: 0.01 };
        Self {
            height: FractalNoise::new(&mut JavaRandom::new(seed), &settings),
        }
    }

    fn generate(&self, cx: i32, cz: i32) -> Box<Chunk> {

        let mut chunk = Chunk::new();

        for x in 0..16 {
            for z in 0..16 {

                let wx = cx * 16 + x;
                let wz = cz * 16 + z;
                let noise = self.height.sample_2d(DVec2::new(wx as f64, wz as f64));
                let height = (64.0 + noise * 16.0) as i32;

                chunk.fill_block(IVec3::new(x, 0, z), IVec3::new(1, 1, 1), block::BEDROCK);
                chunk.fill_block(IVec3::new(x, 1, z), IVec3::new(1, height - 3, 1), block::STONE);

                if height <= SEA_LEVEL {
                    chunk.fill_block(IVec3::new(x, height - 2, z), IVec3::new(1, 3, 1), block::SAND);
                    chunk.fill_block(IVec3::new(x, height + 1, z), IVec3::new(1, SEA_LEVEL - height, 1), block::WATER_STILL);
                } else {
                    chunk.fill_block(IVec3::new(x, height - 2, z), IVec3::new(1, 2, 1), block::DIRT);
                    chunk.set_block(IVec3::new(x, height, z), block::GRASS);
                }

            }
        }

        chunk

    }

}


/// Print the cross-section at the middle of the first row of chunks.
fn print_section(carved: &HashMap<(i32, i32), Box<Chunk>>, chunks: i32) {

    for y in (0..=SECTION_TOP).rev() {
        let mut line = format!("{y:>3} ");
        for cx in 0..chunks {
            let Some(chunk) = carved.get(&(cx, 0)) else { continue };
            for x in 0..16 {
                line.push(section_char(chunk.block(IVec3::new(x, y, SECTION_Z))));
            }
        }
        println!("{line}");
    }

}

fn section_char(id: u8) -> char {
    match id {
        block::AIR => ' ',
        block::WATER_STILL | block::WATER_MOVING => '~',
        block::LAVA_STILL | block::LAVA_MOVING => '%',
        block::GRASS | block::DIRT => '"',
        block::SAND => '.',
        block::BEDROCK => '=',
        block::GLASS | block::WOOL => 'o',
        _ => '#',
    }
}
