//! Progress reporting and cancellation.

use std::ops::ControlFlow;

/// Receives byte counts while an extraction runs.
///
/// Returning `ControlFlow::Break(())` stops the extraction, which then ends
/// with [`Outcome::Cancelled`](crate::Outcome::Cancelled).
pub trait Progress {
    /// Called with the compressed bytes consumed and the bytes produced so far.
    fn report(&mut self, bytes_in: u64, bytes_out: u64) -> ControlFlow<()>;
}

/// Progress sink that ignores every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _bytes_in: u64, _bytes_out: u64) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl<F> Progress for F
where
    F: FnMut(u64, u64) -> ControlFlow<()>,
{
    fn report(&mut self, bytes_in: u64, bytes_out: u64) -> ControlFlow<()> {
        self(bytes_in, bytes_out)
    }
}
