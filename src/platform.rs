//! Host audio-platform seam
//!
//! The real-time engine (node scheduling, sample pull) is assumed to be
//! provided by the host. This module models the one resource the graph
//! has to acquire from it: the processing context. The context is owned
//! exclusively by one [`SignalGraph`](crate::graph::SignalGraph) per
//! session and released in `dispose()`.

use crate::error::{Result, VoluxError};
use log::debug;

/// Lifecycle state of a processing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Allocated but not yet running (hosts commonly start here until a
    /// user gesture arrives)
    Suspended,
    /// Rendering timeline is active
    Running,
    /// Released; the context cannot be resumed again
    Closed,
}

/// A real-time processing context acquired from the platform
#[derive(Debug)]
pub struct Context {
    state: ContextState,
    sample_rate: u32,
}

impl Context {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            state: ContextState::Suspended,
            sample_rate,
        }
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Resume a suspended context; a no-op when already running.
    /// A closed context cannot come back.
    pub fn resume(&mut self) -> Result<()> {
        match self.state {
            ContextState::Closed => Err(VoluxError::GraphNotReady),
            ContextState::Running => Ok(()),
            ContextState::Suspended => {
                self.state = ContextState::Running;
                debug!("[PLATFORM] Context resumed at {} Hz", self.sample_rate);
                Ok(())
            }
        }
    }

    /// Release the context. Safe to call more than once.
    pub fn close(&mut self) {
        if self.state != ContextState::Closed {
            self.state = ContextState::Closed;
            debug!("[PLATFORM] Context closed");
        }
    }
}

/// Factory for processing contexts.
///
/// Allocation can fail (no audio device, host refuses another context);
/// that failure surfaces as `GraphInitFailed` from graph initialization
/// and the session falls back to unprocessed playback.
pub trait AudioPlatform {
    fn create_context(&mut self) -> Result<Context>;
}

/// Default platform: an offline context that always allocates.
///
/// Used by the CLI render path and by any host that drives
/// `process_block` itself.
#[derive(Debug, Clone, Copy)]
pub struct OfflinePlatform {
    sample_rate: u32,
}

impl OfflinePlatform {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

impl Default for OfflinePlatform {
    fn default() -> Self {
        Self::new(48_000)
    }
}

impl AudioPlatform for OfflinePlatform {
    fn create_context(&mut self) -> Result<Context> {
        Ok(Context::new(self.sample_rate))
    }
}
