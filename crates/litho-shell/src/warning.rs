//! Non-fatal conditions reported alongside a successful result.

use serde::Serialize;

/// A condition the pipeline worked around without failing.
///
/// Every warning is also logged with `tracing::warn!` when it is raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// The edge blend band did not fit the image and was halved until it did.
    BlendWidthReduced {
        requested_columns: usize,
        applied_columns: usize,
        image_width: usize,
    },
    /// A segment count hit the `max_segments` ceiling.
    SegmentsClamped {
        axis: SegmentAxis,
        requested: usize,
        applied: usize,
    },
    /// The validator dropped faces that repeated another face's vertex set.
    DuplicateFacesRemoved { count: usize },
    /// The validator dropped faces below the area epsilon.
    DegenerateFacesRemoved { count: usize },
    /// The validator reversed faces to reconcile orientation.
    FacesFlipped { count: usize },
}

/// Tessellation direction of a [`PipelineWarning::SegmentsClamped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentAxis {
    Angular,
    Height,
}

impl std::fmt::Display for SegmentAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentAxis::Angular => write!(f, "angular"),
            SegmentAxis::Height => write!(f, "height"),
        }
    }
}

impl std::fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineWarning::BlendWidthReduced {
                requested_columns,
                applied_columns,
                image_width,
            } => write!(
                f,
                "edge blend reduced from {} to {} columns to fit a {} px wide image",
                requested_columns, applied_columns, image_width
            ),
            PipelineWarning::SegmentsClamped {
                axis,
                requested,
                applied,
            } => write!(
                f,
                "{} segments clamped from {} to {}",
                axis, requested, applied
            ),
            PipelineWarning::DuplicateFacesRemoved { count } => {
                write!(f, "{} duplicate faces removed", count)
            }
            PipelineWarning::DegenerateFacesRemoved { count } => {
                write!(f, "{} degenerate faces removed", count)
            }
            PipelineWarning::FacesFlipped { count } => {
                write!(f, "{} faces flipped during orientation", count)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let w = PipelineWarning::SegmentsClamped {
            axis: SegmentAxis::Angular,
            requested: 5000,
            applied: 2048,
        };
        assert_eq!(w.to_string(), "angular segments clamped from 5000 to 2048");
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_string(&PipelineWarning::FacesFlipped { count: 3 }).unwrap();
        assert_eq!(json, r#"{"kind":"faces_flipped","count":3}"#);
    }
}
