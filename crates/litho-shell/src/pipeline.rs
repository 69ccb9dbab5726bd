//! Staged, cancellable lithophane generation.
//!
//! A job runs four stages in order: mapping intensity to thickness, building
//! the raw shell, validating it and finalizing (vertex normals). Before each
//! stage the pipeline reports progress and checks for cancellation; a stage
//! that has started always runs to completion, and the job then stops with
//! [`LithophaneError::Cancelled`] naming the next stage.

use std::time::Duration;

use tracing::info;

use litho_mesh::progress::{ProgressCallback, SharedProgressTracker, shared_tracker};
use litho_mesh::{Mesh, MeshReport, OperationTimer, RepairReport, compute_vertex_normals};

use crate::cylinder::CylindricalMeshBuilder;
use crate::error::{LithoResult, LithophaneError};
use crate::intensity::IntensityBuffer;
use crate::interpolate::InterpolationMethod;
use crate::spec::CylinderSpec;
use crate::thickness::{ThicknessField, ThicknessMapper, ThicknessParams};
use crate::validator::MeshValidator;
use crate::warning::PipelineWarning;

/// Stages of a lithophane job, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Mapping,
    Building,
    Validating,
    Finalizing,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 4] = [
        PipelineStage::Mapping,
        PipelineStage::Building,
        PipelineStage::Validating,
        PipelineStage::Finalizing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Mapping => "mapping",
            PipelineStage::Building => "building",
            PipelineStage::Validating => "validating",
            PipelineStage::Finalizing => "finalizing",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wall-clock time spent in one stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageTiming {
    pub stage: PipelineStage,
    pub duration: Duration,
}

/// Grid sizes actually used for a job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessellationSummary {
    pub angular_segments: usize,
    pub height_segments: usize,
    /// Edge columns blended on each side of the thickness field.
    pub blend_columns: usize,
    pub interpolation: InterpolationMethod,
}

/// Output of a successful job.
#[derive(Debug, Clone)]
pub struct LithophaneResult {
    /// Certified mesh with vertex normals.
    pub mesh: Mesh,
    pub thickness: ThicknessField,
    pub tessellation: TessellationSummary,
    pub repair: RepairReport,
    pub warnings: Vec<PipelineWarning>,
    pub timings: Vec<StageTiming>,
}

impl LithophaneResult {
    /// Validation report of the certified mesh.
    pub fn validation(&self) -> &MeshReport {
        &self.repair.report
    }

    /// Sum of all stage durations.
    pub fn total_duration(&self) -> Duration {
        self.timings.iter().map(|t| t.duration).sum()
    }
}

/// Runs lithophane jobs for one cylinder spec.
///
/// A pipeline may run many times; progress restarts at zero on every
/// [`run`](Self::run). Cancellation is sticky: once the tracker is cancelled,
/// every later run on it stops at its first checkpoint.
///
/// # Example
///
/// ```
/// use litho_shell::{CylinderSpec, IntensityBuffer, LithophanePipeline};
///
/// let spec = CylinderSpec {
///     outer_diameter_mm: 30.0,
///     height_mm: 20.0,
///     resolution_mm: 1.0,
///     ..Default::default()
/// };
/// let buffer = IntensityBuffer::from_fn(32, 16, |r, c| ((r + c) % 8) as f64 / 7.0).unwrap();
///
/// let result = LithophanePipeline::new(spec).run(&buffer).unwrap();
/// assert!(result.validation().is_printable());
/// ```
pub struct LithophanePipeline {
    spec: CylinderSpec,
    tracker: SharedProgressTracker,
    callback: Option<ProgressCallback>,
}

impl LithophanePipeline {
    pub fn new(spec: CylinderSpec) -> Self {
        Self {
            spec,
            tracker: shared_tracker(PipelineStage::ALL.len() as u64),
            callback: None,
        }
    }

    /// Report progress before each stage; returning `false` cancels the job.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Use an existing tracker so another thread can cancel the job.
    pub fn with_tracker(mut self, tracker: SharedProgressTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn spec(&self) -> &CylinderSpec {
        &self.spec
    }

    /// Handle for cancelling the job from another thread.
    ///
    /// Cancelling through it also cancels any later run of this pipeline.
    pub fn tracker(&self) -> SharedProgressTracker {
        self.tracker.clone()
    }

    fn checkpoint(&self, stage: PipelineStage) -> LithoResult<()> {
        if self.tracker.checkpoint(self.callback.as_ref(), stage.as_str()) {
            Ok(())
        } else {
            info!(stage = stage.as_str(), "Lithophane job cancelled");
            Err(LithophaneError::cancelled(stage.as_str()))
        }
    }

    /// Run every stage on `buffer`.
    ///
    /// The cylinder configuration is validated first, so configuration errors
    /// are reported before any geometry is built.
    pub fn run(&self, buffer: &IntensityBuffer) -> LithoResult<LithophaneResult> {
        let _timer = OperationTimer::new("lithophane_pipeline");
        let builder = CylindricalMeshBuilder::new(&self.spec)?;
        self.tracker.set(0);
        let mut warnings = builder.tessellation().warnings();
        let mut timings = Vec::with_capacity(PipelineStage::ALL.len());
        let mut timed = |stage: PipelineStage, timer: OperationTimer| {
            timings.push(StageTiming {
                stage,
                duration: timer.elapsed(),
            });
        };

        self.checkpoint(PipelineStage::Mapping)?;
        let timer = OperationTimer::new(PipelineStage::Mapping.as_str());
        let mapping = ThicknessMapper::new(ThicknessParams::from_spec(&self.spec))?.map(buffer)?;
        warnings.extend(mapping.warnings.iter().cloned());
        timed(PipelineStage::Mapping, timer);
        self.tracker.increment();

        self.checkpoint(PipelineStage::Building)?;
        let timer = OperationTimer::new(PipelineStage::Building.as_str());
        let shell = builder.generate(&mapping.field)?;
        timed(PipelineStage::Building, timer);
        self.tracker.increment();

        self.checkpoint(PipelineStage::Validating)?;
        let timer = OperationTimer::new(PipelineStage::Validating.as_str());
        let mut mesh = shell.mesh;
        let outcome = MeshValidator::without_normals().validate(&mut mesh)?;
        warnings.extend(outcome.warnings);
        timed(PipelineStage::Validating, timer);
        self.tracker.increment();

        self.checkpoint(PipelineStage::Finalizing)?;
        let timer = OperationTimer::new(PipelineStage::Finalizing.as_str());
        compute_vertex_normals(&mut mesh);
        timed(PipelineStage::Finalizing, timer);
        self.tracker.increment();

        let tessellation = *builder.tessellation();
        info!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            warnings = warnings.len(),
            "Lithophane generated"
        );

        Ok(LithophaneResult {
            mesh,
            thickness: mapping.field,
            tessellation: TessellationSummary {
                angular_segments: tessellation.angular_segments,
                height_segments: tessellation.height_segments,
                blend_columns: mapping.blend_columns,
                interpolation: shell.interpolation,
            },
            repair: outcome.repair,
            warnings,
            timings,
        })
    }
}

/// Generate a lithophane with no progress reporting.
pub fn generate_lithophane(
    buffer: &IntensityBuffer,
    spec: &CylinderSpec,
) -> LithoResult<LithophaneResult> {
    LithophanePipeline::new(spec.clone()).run(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn spec() -> CylinderSpec {
        CylinderSpec {
            outer_diameter_mm: 24.0,
            height_mm: 16.0,
            resolution_mm: 1.0,
            ..Default::default()
        }
    }

    fn buffer() -> IntensityBuffer {
        IntensityBuffer::from_fn(24, 12, |r, c| ((r * 5 + c) % 11) as f64 / 10.0).unwrap()
    }

    #[test]
    fn test_all_stages_timed_in_order() {
        let result = generate_lithophane(&buffer(), &spec()).unwrap();
        let stages: Vec<_> = result.timings.iter().map(|t| t.stage).collect();
        assert_eq!(stages, PipelineStage::ALL.to_vec());
        assert!(result.mesh.vertices.iter().all(|v| v.normal.is_some()));
        assert!(result.validation().is_printable());
    }

    #[test]
    fn test_progress_reports_each_stage() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let pipeline = LithophanePipeline::new(spec()).with_progress(Box::new(move |p| {
            log.lock().unwrap().push((p.current, p.message.clone()));
            true
        }));
        pipeline.run(&buffer()).unwrap();

        let seen = seen.lock().unwrap();
        let expected: Vec<(u64, String)> = PipelineStage::ALL
            .iter()
            .enumerate()
            .map(|(i, s)| (i as u64, s.as_str().to_string()))
            .collect();
        assert_eq!(*seen, expected);
    }

    #[test]
    fn test_rerun_restarts_progress() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let pipeline = LithophanePipeline::new(spec()).with_progress(Box::new(move |p| {
            log.lock().unwrap().push(p.current);
            true
        }));
        let first = pipeline.run(&buffer()).unwrap();
        let second = pipeline.run(&buffer()).unwrap();

        assert_eq!(first.mesh, second.mesh);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 0, 1, 2, 3]);
        assert_eq!(pipeline.tracker().current(), 4);
    }

    #[test]
    fn test_cancellation_is_sticky() {
        let pipeline = LithophanePipeline::new(spec());
        pipeline.tracker().cancel();
        for _ in 0..2 {
            assert!(matches!(
                pipeline.run(&buffer()),
                Err(LithophaneError::Cancelled { .. })
            ));
        }
        assert!(LithophanePipeline::new(spec()).run(&buffer()).is_ok());
    }

    #[test]
    fn test_cancel_before_start() {
        let pipeline = LithophanePipeline::new(spec());
        pipeline.tracker().cancel();
        match pipeline.run(&buffer()) {
            Err(LithophaneError::Cancelled { stage }) => assert_eq!(stage, "mapping"),
            other => panic!("Expected Cancelled, got {:?}", other.map(|r| r.mesh.face_count())),
        }
    }

    #[test]
    fn test_invalid_spec_wins_over_cancellation() {
        let pipeline = LithophanePipeline::new(CylinderSpec {
            wall_thickness_mm: 12.0,
            ..spec()
        });
        pipeline.tracker().cancel();
        assert!(matches!(
            pipeline.run(&buffer()),
            Err(LithophaneError::InvalidConfiguration { .. })
        ));
    }
}
