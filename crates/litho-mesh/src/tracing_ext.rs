//! Tracing extensions for mesh operations.
//!
//! Structured logging and timing for mesh generation and repair. Enable it by
//! installing a subscriber in the application:
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // RUST_LOG=litho_mesh=debug,litho_shell=debug for detailed output
//! ```
//!
//! # Log Targets
//!
//! - `litho_mesh::timing`: operation durations
//! - `litho_mesh::mesh_state`: mesh size snapshots
//! - `litho_mesh::validation`: certification results
//! - `litho_mesh::repair`: repair pass counts

use std::time::{Duration, Instant};
use tracing::{Span, debug, info, warn};

/// A performance timer that logs duration on drop.
///
/// # Example
///
/// ```rust
/// use litho_mesh::tracing_ext::OperationTimer;
///
/// fn expensive_operation() {
///     let _timer = OperationTimer::new("expensive_operation");
///     // ... do work ...
/// } // Timer logs duration when dropped
/// # expensive_operation();
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Create a new operation timer.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("mesh_operation", operation = name);
        debug!(target: "litho_mesh::timing", operation = name, "Starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Create a timer with mesh size context fields.
    pub fn with_context(name: &'static str, face_count: usize, vertex_count: usize) -> Self {
        let span = tracing::info_span!(
            "mesh_operation",
            operation = name,
            faces = face_count,
            vertices = vertex_count
        );
        debug!(
            target: "litho_mesh::timing",
            operation = name,
            faces = face_count,
            vertices = vertex_count,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Get the elapsed time.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get the elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }

    /// Get the span for this timer.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        info!(
            target: "litho_mesh::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", self.elapsed_ms()),
            "Operation completed"
        );
    }
}

/// Log mesh statistics at debug level.
pub fn log_mesh_stats(mesh: &crate::Mesh, context: &str) {
    let (min_bounds, max_bounds) = mesh.bounds().unwrap_or_default();
    let dims = max_bounds - min_bounds;

    debug!(
        target: "litho_mesh::mesh_state",
        context = context,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        dimensions = format!("{:.2} x {:.2} x {:.2}", dims.x, dims.y, dims.z),
        "Mesh state"
    );
}

/// Log a validation result.
pub fn log_validation_result(report: &crate::MeshReport) {
    if report.is_printable() {
        info!(
            target: "litho_mesh::validation",
            vertex_count = report.vertex_count,
            face_count = report.face_count,
            volume = format!("{:.2}", report.volume),
            "Mesh certified watertight and outward oriented"
        );
    } else {
        warn!(
            target: "litho_mesh::validation",
            is_watertight = report.is_watertight,
            is_manifold = report.is_manifold,
            boundary_edges = report.boundary_edge_count,
            non_manifold_edges = report.non_manifold_edge_count,
            inconsistent_edges = report.inconsistent_edge_count,
            is_inside_out = report.is_inside_out,
            "Mesh validation found issues"
        );
    }
}

/// Log a repair operation result.
pub fn log_repair_result(operation: &str, items_fixed: usize) {
    debug!(
        target: "litho_mesh::repair",
        operation = operation,
        items_fixed = items_fixed,
        "Repair pass completed"
    );
}
