//! Lifecycle of a single planning request.
//!
//! A session owns the graph for one request and walks through
//! `Uninitialized -> GraphReady -> TrafficApplied -> OptimizationComplete`.
//! Traffic is optional but may only be applied once, before optimisation.
//! Once optimisation starts the graph and overlay are frozen.

use std::fmt;

use log::debug;
use thiserror::Error;

use crate::{NetworkGraph, OverlayStats, TrafficOverlay, TrafficSnapshot, WeightedGraph};

/// Stage reached by a [`PlanningSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No graph loaded yet.
    Uninitialized,
    /// Graph loaded; traffic may still be applied.
    GraphReady,
    /// Traffic overlay applied.
    TrafficApplied,
    /// Optimisation has run; the session is finished.
    OptimizationComplete,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::GraphReady => "graph ready",
            Self::TrafficApplied => "traffic applied",
            Self::OptimizationComplete => "optimization complete",
        })
    }
}

/// A session step was attempted out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move planning session from {from} to {to}")]
pub struct TransitionError {
    /// State the session was in.
    pub from: SessionState,
    /// State the step would have entered.
    pub to: SessionState,
}

/// State machine guarding one planning request.
///
/// # Examples
/// ```
/// use stopover_core::{GeoPoint, NetworkGraph, NodeId, PlanningSession, SessionState};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut builder = NetworkGraph::builder();
/// builder.add_node(NodeId(1), GeoPoint::new(0.0, 0.0))?;
///
/// let mut session = PlanningSession::new();
/// session.load_graph(builder.build())?;
/// let nodes = session.optimise(|view| view.graph().node_count())?;
/// assert_eq!(nodes, 1);
/// assert_eq!(session.state(), SessionState::OptimizationComplete);
/// assert!(session.optimise(|_| ()).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PlanningSession {
    state: SessionState,
    graph: Option<NetworkGraph>,
    overlay: TrafficOverlay,
}

impl Default for PlanningSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanningSession {
    /// Start a session with no graph.
    pub fn new() -> Self {
        Self {
            state: SessionState::Uninitialized,
            graph: None,
            overlay: TrafficOverlay::new(),
        }
    }

    /// Current stage.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The loaded graph, if any.
    pub fn graph(&self) -> Option<&NetworkGraph> {
        self.graph.as_ref()
    }

    /// Install the graph for this request.
    pub fn load_graph(&mut self, graph: NetworkGraph) -> Result<(), TransitionError> {
        self.advance(SessionState::GraphReady, &[SessionState::Uninitialized])?;
        debug!(
            "session graph loaded: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        self.graph = Some(graph);
        Ok(())
    }

    /// Apply a traffic snapshot to the loaded graph.
    pub fn apply_traffic(
        &mut self,
        snapshot: &TrafficSnapshot,
    ) -> Result<OverlayStats, TransitionError> {
        let to = SessionState::TrafficApplied;
        let Some(graph) = self.graph.as_ref().filter(|_| self.state == SessionState::GraphReady)
        else {
            return Err(TransitionError {
                from: self.state,
                to,
            });
        };
        let stats = self.overlay.apply(graph, snapshot);
        self.state = to;
        Ok(stats)
    }

    /// Freeze the session and run `optimise` over the weighted view.
    ///
    /// The session is complete afterwards whatever `optimise` returns.
    pub fn optimise<T, F>(&mut self, optimise: F) -> Result<T, TransitionError>
    where
        F: FnOnce(WeightedGraph<'_>) -> T,
    {
        self.advance(
            SessionState::OptimizationComplete,
            &[SessionState::GraphReady, SessionState::TrafficApplied],
        )?;
        let graph = self.graph.as_ref().ok_or(TransitionError {
            from: SessionState::Uninitialized,
            to: SessionState::OptimizationComplete,
        })?;
        Ok(optimise(WeightedGraph::new(graph, &self.overlay)))
    }

    fn advance(
        &mut self,
        to: SessionState,
        allowed_from: &[SessionState],
    ) -> Result<(), TransitionError> {
        if !allowed_from.contains(&self.state) {
            return Err(TransitionError {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}
