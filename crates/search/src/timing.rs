//! Wall-clock measurement that degrades to zero where no clock exists.
//!
//! `std::time::Instant` panics on `wasm32-unknown-unknown`, so timings are
//! reported as `0.0` there.

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Measures elapsed milliseconds since creation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Stopwatch {
    #[cfg(not(target_arch = "wasm32"))]
    started: Instant,
}

impl Stopwatch {
    pub(crate) fn start() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            started: Instant::now(),
        }
    }

    pub(crate) fn elapsed_ms(&self) -> f64 {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.started.elapsed().as_secs_f64() * 1000.0
        }
        #[cfg(target_arch = "wasm32")]
        {
            0.0
        }
    }
}
