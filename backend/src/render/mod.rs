//! The render capability: card configuration in, PNG out.
//!
//! A `CardRenderer` is one render target. The exporter loads a configuration,
//! waits for the target to reflect it, then captures it, one record at a time.
//! Targets that lay out asynchronously and give no completion signal keep the
//! default `wait_until_ready`, which sleeps for the configured bound; this is a
//! latency/correctness trade-off, not a guarantee. Targets that know when they
//! are done (such as `RasterRenderer`) override it.

mod raster;

pub use raster::{parse_hex_color, RasterRenderer};

use crate::error::RenderError;
use common::model::design::CardConfig;
use std::time::Duration;

pub trait CardRenderer: Send {
    /// Replace whatever is on the target with `config`.
    fn load(&mut self, config: &CardConfig) -> Result<(), RenderError>;

    /// Block until the target shows the last loaded configuration.
    fn wait_until_ready(&mut self, bound: Duration) {
        if !bound.is_zero() {
            std::thread::sleep(bound);
        }
    }

    /// Encode the target as PNG at `scale` times the base resolution.
    fn capture(&mut self, scale: u32) -> Result<Vec<u8>, RenderError>;
}
