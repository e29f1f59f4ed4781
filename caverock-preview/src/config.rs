//! The configuration of the preview, given from environment variables and lazy
//! initialized when needed.

use std::num::NonZeroUsize;
use std::str::FromStr;
use std::env;

use once_cell::race::{OnceBool, OnceNonZeroUsize};
use once_cell::sync::OnceCell;
use tracing::warn;

use caverock::block;


/// Return the world seed.
///
/// To change it, set `CAVEROCK_SEED=<integer>`, defaults to 0.
pub fn seed() -> i64 {
    static ENV: OnceCell<i64> = OnceCell::new();
    *ENV.get_or_init(|| parse_var("CAVEROCK_SEED").unwrap_or(0))
}

/// Return the number of chunks carved along each horizontal axis.
///
/// To change it, set `CAVEROCK_CHUNKS=<count>`, defaults to 2.
pub fn chunks() -> usize {
    static ENV: OnceNonZeroUsize = OnceNonZeroUsize::new();
    ENV.get_or_init(|| non_zero_var("CAVEROCK_CHUNKS", 2)).get()
}

/// Return the number of carving worker threads.
///
/// To change it, set `CAVEROCK_WORKERS=<count>`, defaults to 2.
pub fn workers() -> usize {
    static ENV: OnceNonZeroUsize = OnceNonZeroUsize::new();
    ENV.get_or_init(|| non_zero_var("CAVEROCK_WORKERS", 2)).get()
}

/// Return the block filling carved voxels at low altitude.
///
/// To change it, set `CAVEROCK_LIQUID=<block name>`, defaults to `lava_still`.
pub fn liquid() -> u8 {
    static ENV: OnceCell<u8> = OnceCell::new();
    *ENV.get_or_init(|| {
        let Ok(name) = env::var("CAVEROCK_LIQUID") else {
            return block::LAVA_STILL;
        };
        match block::from_name(name.trim()) {
            Some(id) => id,
            None => {
                warn!("unknown block for CAVEROCK_LIQUID: {name:?}, using default");
                block::LAVA_STILL
            }
        }
    })
}

/// Return true if carvers should mark voxels instead of carving them.
///
/// To enable this feature, set `CAVEROCK_DEBUG_VISUALIZER=1`.
pub fn debug_visualizer() -> bool {
    static ENV: OnceBool = OnceBool::new();
    ENV.get_or_init(|| {
        env::var_os("CAVEROCK_DEBUG_VISUALIZER")
            .map(|s| s.as_encoded_bytes() == b"1")
            .unwrap_or(false)
    })
}

/// Parse the given variable, invalid values are logged and ignored.
fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let value = env::var(name).ok()?;
    match value.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("invalid value for {name}: {value:?}, using default");
            None
        }
    }
}

fn non_zero_var(name: &str, default: usize) -> NonZeroUsize {
    parse_var::<NonZeroUsize>(name)
        .or(NonZeroUsize::new(default))
        .unwrap_or(NonZeroUsize::MIN)
}
