//! Real-time signal graph
//!
//! Holds the live node topology and executes topology transitions without
//! audible discontinuity. Two timelines touch this type: the control
//! timeline calls everything except [`SignalGraph::process_block`], which
//! belongs to the rendering timeline. Control calls only swap edge lists
//! and retarget ramps; they never manipulate samples.
//!
//! Topology is exactly one of:
//! - Direct: source → preamp → main-gain → destination
//! - Equalized: source → filter1 → … → filter6 → main-gain → destination
//!
//! The preamp keeps existing in the equalized variant; it is off the edge
//! list and its gain is driven to unity while inactive.

mod node;

pub use node::NodeRole;

use node::FilterNode;

use crate::dsp::ParamRamp;
use crate::eq::{EqConfig, BAND_COUNT};
use crate::error::{Result, VoluxError};
use crate::platform::{AudioPlatform, Context};
use log::debug;
use std::fmt;

/// Loudness-compensation boost applied to the preamp while the EQ is active
pub const PREAMP_ACTIVE_GAIN: f64 = 1.4;

/// Preamp gain on the direct path
pub const PREAMP_BYPASS_GAIN: f64 = 1.0;

/// Graph lifecycle states. `Direct` and `Equalized` are the only steady
/// states during playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphState {
    Uninitialized,
    Direct,
    Equalized,
    Disposed,
}

impl fmt::Display for GraphState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphState::Uninitialized => write!(f, "uninitialized"),
            GraphState::Direct => write!(f, "direct"),
            GraphState::Equalized => write!(f, "equalized"),
            GraphState::Disposed => write!(f, "disposed"),
        }
    }
}

/// A directed connection between two node roles
pub type Edge = (NodeRole, NodeRole);

/// Node roster and rendering state, built exactly once per graph
struct GraphNodes {
    preamp: ParamRamp,
    filters: Vec<FilterNode>,
    /// Steady-state volume; applied immediately, never ramped
    main_gain: f64,
}

/// The stateful audio node topology for one session.
pub struct SignalGraph {
    state: GraphState,
    config: EqConfig,
    platform: Box<dyn AudioPlatform>,
    context: Option<Context>,
    nodes: Option<GraphNodes>,
    edges: Vec<Edge>,
}

impl SignalGraph {
    /// Create an uninitialized graph. Nothing is allocated until
    /// [`initialize`](Self::initialize).
    pub fn new(config: EqConfig, platform: Box<dyn AudioPlatform>) -> Self {
        Self {
            state: GraphState::Uninitialized,
            config,
            platform,
            context: None,
            nodes: None,
            edges: Vec::new(),
        }
    }

    /// Construct all nodes and connect the topology for `initial_enabled`.
    ///
    /// Idempotent: a second call while initialized is a no-op returning
    /// the current state. A failed context allocation surfaces as
    /// `GraphInitFailed` and leaves the graph uninitialized, so the
    /// caller can fall back to unprocessed playback.
    pub fn initialize(&mut self, initial_enabled: bool) -> Result<GraphState> {
        match self.state {
            GraphState::Direct | GraphState::Equalized => return Ok(self.state),
            GraphState::Disposed => return Err(VoluxError::GraphNotReady),
            GraphState::Uninitialized => {}
        }

        let context = self.platform.create_context().map_err(|e| match e {
            VoluxError::GraphInitFailed { .. } => e,
            other => VoluxError::GraphInitFailed {
                reason: other.to_string(),
            },
        })?;
        let sample_rate = context.sample_rate() as f64;

        let mut filters: Vec<FilterNode> = self
            .config
            .bands
            .iter()
            .map(|band| FilterNode::new(*band, sample_rate))
            .collect();
        let mut preamp = ParamRamp::new(PREAMP_BYPASS_GAIN, sample_rate);

        // No audio has flowed yet, so the initial gains need no ramp
        if initial_enabled {
            preamp.set_immediate(PREAMP_ACTIVE_GAIN);
            for filter in &mut filters {
                let gain_db = filter.band().gain_db;
                filter.set_gain_immediate(gain_db);
            }
        }

        self.context = Some(context);
        self.nodes = Some(GraphNodes {
            preamp,
            filters,
            main_gain: 1.0,
        });
        self.edges = Self::topology_edges(initial_enabled);
        self.state = if initial_enabled {
            GraphState::Equalized
        } else {
            GraphState::Direct
        };
        debug!(
            "[GRAPH] Initialized: {} topology, {} nodes, {} edges",
            self.state,
            self.node_count(),
            self.edge_count()
        );
        Ok(self.state)
    }

    /// Apply the steady-state volume to the main gain node, immediately.
    /// This is distinct from topology-change ramps.
    pub fn set_gain(&mut self, value: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&value) {
            return Err(VoluxError::InvalidArgument {
                param: "gain",
                value,
                expected: "0.0..=1.0",
            });
        }
        let nodes = self.nodes.as_mut().ok_or(VoluxError::GraphNotReady)?;
        nodes.main_gain = value;
        debug!("[GRAPH] Main gain set to {value:.4}");
        Ok(())
    }

    /// Atomic topology swap between the direct and equalized paths.
    ///
    /// Disconnect-everything happens before reconnect, and the new edge
    /// list is complete before control returns; the rendering timeline
    /// never observes both paths feeding the main gain. Gains move on
    /// 20 ms ramps; a toggle that lands on the current topology is a
    /// no-op.
    pub fn set_eq_enabled(&mut self, enabled: bool) -> Result<()> {
        let nodes = self.nodes.as_mut().ok_or(VoluxError::GraphNotReady)?;
        let target = if enabled {
            GraphState::Equalized
        } else {
            GraphState::Direct
        };
        if self.state == target {
            return Ok(());
        }

        // Disconnect all current edges, then connect the new path
        self.edges.clear();
        self.edges.extend(Self::topology_edges(enabled));

        if enabled {
            for filter in &mut nodes.filters {
                // The delay lines carry stale samples from the last time
                // this path was live
                filter.reset();
                filter.ramp_to_band_gain();
            }
            nodes.preamp.set_target(PREAMP_ACTIVE_GAIN);
        } else {
            for filter in &mut nodes.filters {
                filter.ramp_to_unity();
            }
            nodes.preamp.set_target(PREAMP_BYPASS_GAIN);
        }

        // Flag flips only after reconnection succeeded
        self.state = target;
        self.config.enabled = enabled;
        debug!("[GRAPH] Topology now {} ({} edges)", self.state, self.edge_count());
        Ok(())
    }

    /// Resume the processing context if the platform left it suspended
    pub fn ensure_running(&mut self) -> Result<()> {
        self.context
            .as_mut()
            .ok_or(VoluxError::GraphNotReady)?
            .resume()
    }

    /// Rendering-timeline pull: apply the active path to a block of
    /// samples, advancing every ramp sample-accurately. A graph that is
    /// not in a steady state leaves the block untouched.
    pub fn process_block(&mut self, samples: &mut [f32]) {
        let Some(nodes) = self.nodes.as_mut() else {
            return;
        };
        match self.state {
            GraphState::Direct => {
                for sample in samples.iter_mut() {
                    let preamp = nodes.preamp.advance();
                    // Off-path filters keep ramping toward 0 dB
                    for filter in &mut nodes.filters {
                        filter.advance_idle();
                    }
                    *sample = (*sample as f64 * preamp * nodes.main_gain) as f32;
                }
            }
            GraphState::Equalized => {
                for sample in samples.iter_mut() {
                    // The preamp is off this path; keep its ramp moving
                    nodes.preamp.advance();
                    let mut acc = *sample as f64;
                    for filter in &mut nodes.filters {
                        acc = filter.process(acc);
                    }
                    *sample = (acc * nodes.main_gain) as f32;
                }
            }
            GraphState::Uninitialized | GraphState::Disposed => {}
        }
    }

    /// Disconnect everything and release the context. Idempotent.
    pub fn dispose(&mut self) {
        if self.state == GraphState::Disposed {
            return;
        }
        self.edges.clear();
        self.nodes = None;
        if let Some(mut context) = self.context.take() {
            context.close();
        }
        self.state = GraphState::Disposed;
        debug!("[GRAPH] Disposed");
    }

    fn topology_edges(enabled: bool) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(BAND_COUNT + 2);
        if enabled {
            edges.push((NodeRole::Source, NodeRole::Filter(0)));
            for i in 0..BAND_COUNT - 1 {
                edges.push((NodeRole::Filter(i), NodeRole::Filter(i + 1)));
            }
            edges.push((NodeRole::Filter(BAND_COUNT - 1), NodeRole::MainGain));
        } else {
            edges.push((NodeRole::Source, NodeRole::Preamp));
            edges.push((NodeRole::Preamp, NodeRole::MainGain));
        }
        edges.push((NodeRole::MainGain, NodeRole::Destination));
        edges
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn state(&self) -> GraphState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, GraphState::Direct | GraphState::Equalized)
    }

    pub fn eq_enabled(&self) -> bool {
        self.state == GraphState::Equalized
    }

    /// Number of constructed nodes (source, preamp, filters, main gain,
    /// destination); zero before initialization and after disposal
    pub fn node_count(&self) -> usize {
        match &self.nodes {
            Some(nodes) => nodes.filters.len() + 4,
            None => 0,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.context.as_ref().map(|c| c.sample_rate())
    }

    pub fn preamp_gain(&self) -> Option<f64> {
        self.nodes.as_ref().map(|n| n.preamp.value())
    }

    pub fn main_gain(&self) -> Option<f64> {
        self.nodes.as_ref().map(|n| n.main_gain)
    }

    pub fn filter_gains_db(&self) -> Vec<f64> {
        match &self.nodes {
            Some(nodes) => nodes.filters.iter().map(|f| f.gain_db()).collect(),
            None => Vec::new(),
        }
    }
}

impl Drop for SignalGraph {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for SignalGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalGraph")
            .field("state", &self.state)
            .field("nodes", &self.node_count())
            .field("edges", &self.edges)
            .finish()
    }
}
