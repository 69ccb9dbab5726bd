//! Cylindrical shell tessellation.
//!
//! The shell is a surface of revolution. Its cross-section in the `(r, z)`
//! half-plane is a closed profile of rings, listed counter-clockwise:
//!
//! 1. outer wall rows, bottom to top (radius follows the thickness field);
//! 2. the top cap rings, if the top is closed;
//! 3. inner wall rows, top to bottom (constant inner radius);
//! 4. the bottom cap rings, if the bottom is closed.
//!
//! Every ring holds one vertex per angular segment, except rings on the axis
//! which collapse to a single center vertex. Consecutive rings (wrapping from
//! the last back to the first) are joined by a strip of triangles. Strips
//! between two full rings are quads split in two, strips touching the axis
//! are fans, and strips between two ends of the same rim are annuli, so open
//! ends need no special case. Because the profile runs counter-clockwise,
//! the strip winding yields outward normals everywhere: away from the axis on
//! the outer wall, toward it on the inner wall.

use std::f64::consts::TAU;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use litho_mesh::{Mesh, OperationTimer, Vertex, log_mesh_stats};

use crate::error::LithoResult;
use crate::interpolate::{InterpolationMethod, SurfaceInterpolator};
use crate::spec::{CylinderSpec, EndCap, MIN_ANGULAR_SEGMENTS};
use crate::thickness::ThicknessField;
use crate::warning::{PipelineWarning, SegmentAxis};

/// Tolerance when deciding whether an angle falls inside the image window.
const WINDOW_EPSILON: f64 = 1e-9;

/// Rows closer than this to a cap plane are merged into it.
const ROW_MERGE_EPSILON_MM: f64 = 1e-6;

/// Surface a generated vertex belongs to, stored in [`Vertex::tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SurfaceTag {
    /// Outer wall, including the margins.
    Outer = 1,
    /// Inner wall.
    Inner = 2,
    /// Cap rings: bore wall or axis centers.
    Cap = 3,
}

impl SurfaceTag {
    /// Tag of a vertex produced by [`CylindricalMeshBuilder`].
    pub fn of(vertex: &Vertex) -> Option<Self> {
        match vertex.tag? {
            1 => Some(SurfaceTag::Outer),
            2 => Some(SurfaceTag::Inner),
            3 => Some(SurfaceTag::Cap),
            _ => None,
        }
    }
}

/// Segment counts derived from a spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tessellation {
    pub angular_segments: usize,
    pub height_segments: usize,
    /// Angular count before clamping to `max_segments`.
    pub requested_angular: usize,
    /// Height count before clamping to `max_segments`.
    pub requested_height: usize,
}

impl Tessellation {
    /// Size the grid from resolution and quality, clamped to `max_segments`.
    ///
    /// # Example
    ///
    /// ```
    /// use litho_shell::{CylinderSpec, Tessellation};
    ///
    /// let spec = CylinderSpec {
    ///     resolution_mm: 1.0,
    ///     ..Default::default()
    /// };
    /// let tess = Tessellation::for_spec(&spec);
    /// assert_eq!(tess.angular_segments, 252); // ceil(2π · 40)
    /// assert_eq!(tess.height_segments, 90);
    /// ```
    pub fn for_spec(spec: &CylinderSpec) -> Self {
        let step = spec.resolution_mm / spec.mesh_quality_multiplier;
        let requested_angular = (TAU * spec.outer_radius() / step).ceil() as usize;
        let requested_height = (spec.image_band_height() / step).ceil() as usize;
        let max = spec.max_segments.max(MIN_ANGULAR_SEGMENTS);

        Self {
            angular_segments: requested_angular.clamp(MIN_ANGULAR_SEGMENTS, max),
            height_segments: requested_height.clamp(1, max),
            requested_angular,
            requested_height,
        }
    }

    /// Warnings for counts that hit the ceiling.
    pub fn warnings(&self) -> Vec<PipelineWarning> {
        let mut warnings = Vec::new();
        if self.requested_angular > self.angular_segments {
            warnings.push(PipelineWarning::SegmentsClamped {
                axis: SegmentAxis::Angular,
                requested: self.requested_angular,
                applied: self.angular_segments,
            });
        }
        if self.requested_height > self.height_segments {
            warnings.push(PipelineWarning::SegmentsClamped {
                axis: SegmentAxis::Height,
                requested: self.requested_height,
                applied: self.height_segments,
            });
        }
        warnings
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RingRadius {
    /// Outer wall. `Some(k)` is image band row k, `None` a margin row.
    Relief(Option<usize>),
    Inner,
    Bore(f64),
    Axis,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Ring {
    z: f64,
    radius: RingRadius,
}

impl Ring {
    fn is_axis(&self) -> bool {
        self.radius == RingRadius::Axis
    }

    fn tag(&self) -> SurfaceTag {
        match self.radius {
            RingRadius::Relief(_) => SurfaceTag::Outer,
            RingRadius::Inner => SurfaceTag::Inner,
            RingRadius::Bore(_) | RingRadius::Axis => SurfaceTag::Cap,
        }
    }
}

/// Cap rings in profile order: the first plane reached, then the second.
fn cap_rings(cap: &EndCap, first_z: f64, second_z: f64) -> Vec<Ring> {
    match *cap {
        EndCap::Open => Vec::new(),
        EndCap::Closed {
            bore_diameter_mm, ..
        } => {
            let radius = if bore_diameter_mm > 0.0 {
                RingRadius::Bore(bore_diameter_mm / 2.0)
            } else {
                RingRadius::Axis
            };
            vec![
                Ring { z: first_z, radius },
                Ring {
                    z: second_z,
                    radius,
                },
            ]
        }
    }
}

/// Ring profile of a cylinder, without any thickness data.
#[derive(Debug, Clone)]
pub struct CylinderLayout {
    tessellation: Tessellation,
    rings: Vec<Ring>,
}

impl CylinderLayout {
    /// Lay out the profile for a validated spec.
    pub fn new(spec: &CylinderSpec, tessellation: Tessellation) -> Self {
        let height = spec.height_mm;
        let segments = tessellation.height_segments;
        let bottom_margin = spec.bottom_margin_mm > ROW_MERGE_EPSILON_MM;
        let top_margin = spec.top_margin_mm > ROW_MERGE_EPSILON_MM;
        let band_bottom = if bottom_margin { spec.bottom_margin_mm } else { 0.0 };
        let band_top = if top_margin {
            height - spec.top_margin_mm
        } else {
            height
        };
        let band_step = (band_top - band_bottom) / segments as f64;

        let mut outer = Vec::with_capacity(segments + 3);
        if bottom_margin {
            outer.push(Ring {
                z: 0.0,
                radius: RingRadius::Relief(None),
            });
        }
        for k in 0..=segments {
            let z = if k == segments {
                band_top
            } else {
                band_bottom + k as f64 * band_step
            };
            outer.push(Ring {
                z,
                radius: RingRadius::Relief(Some(k)),
            });
        }
        if top_margin {
            outer.push(Ring {
                z: height,
                radius: RingRadius::Relief(None),
            });
        }

        let floor = spec.bottom_cap.thickness();
        let ceiling = height - spec.top_cap.thickness();
        let mut inner = vec![Ring {
            z: ceiling,
            radius: RingRadius::Inner,
        }];
        inner.extend(
            outer
                .iter()
                .rev()
                .filter(|r| {
                    r.z > floor + ROW_MERGE_EPSILON_MM && r.z < ceiling - ROW_MERGE_EPSILON_MM
                })
                .map(|r| Ring {
                    z: r.z,
                    radius: RingRadius::Inner,
                }),
        );
        inner.push(Ring {
            z: floor,
            radius: RingRadius::Inner,
        });

        let mut rings = outer;
        rings.extend(cap_rings(&spec.top_cap, height, ceiling));
        rings.extend(inner);
        rings.extend(cap_rings(&spec.bottom_cap, floor, 0.0));

        Self {
            tessellation,
            rings,
        }
    }

    pub fn tessellation(&self) -> &Tessellation {
        &self.tessellation
    }

    /// Number of rings in the profile.
    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    fn ring_size(&self, ring: &Ring) -> usize {
        if ring.is_axis() {
            1
        } else {
            self.tessellation.angular_segments
        }
    }

    /// Vertices the raw mesh will have.
    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(|r| self.ring_size(r)).sum()
    }

    /// Faces the raw mesh will have.
    pub fn face_count(&self) -> usize {
        let n = self.tessellation.angular_segments;
        (0..self.rings.len())
            .map(|k| {
                let a = &self.rings[k];
                let b = &self.rings[(k + 1) % self.rings.len()];
                match (a.is_axis(), b.is_axis()) {
                    (false, false) => 2 * n,
                    (true, true) => 0,
                    _ => n,
                }
            })
            .sum()
    }

    fn offsets(&self) -> Vec<u32> {
        let mut offsets = Vec::with_capacity(self.rings.len());
        let mut next = 0u32;
        for ring in &self.rings {
            offsets.push(next);
            next += self.ring_size(ring) as u32;
        }
        offsets
    }
}

/// Where an angular column falls relative to the image window.
#[derive(Debug, Clone, Copy)]
struct Column {
    cos: f64,
    sin: f64,
    /// Fraction across the window and curvature factor, `None` on the solid back arc.
    window: Option<(f64, f64)>,
}

/// Raw shell geometry before validation.
#[derive(Debug, Clone)]
pub struct GeneratedShell {
    pub mesh: Mesh,
    pub interpolation: InterpolationMethod,
}

/// Generates the raw triangle mesh of a lithophane cylinder.
///
/// # Example
///
/// ```
/// use litho_shell::{
///     CylinderSpec, CylindricalMeshBuilder, IntensityBuffer, ThicknessParams, map_thickness,
/// };
///
/// let spec = CylinderSpec {
///     outer_diameter_mm: 30.0,
///     height_mm: 20.0,
///     resolution_mm: 1.0,
///     ..Default::default()
/// };
/// let buffer = IntensityBuffer::uniform(32, 16, 0.5).unwrap();
/// let mapping = map_thickness(&buffer, &ThicknessParams::from_spec(&spec)).unwrap();
///
/// let builder = CylindricalMeshBuilder::new(&spec).unwrap();
/// let shell = builder.generate(&mapping.field).unwrap();
/// assert_eq!(shell.mesh.face_count(), builder.layout().face_count());
/// ```
#[derive(Debug, Clone)]
pub struct CylindricalMeshBuilder {
    spec: CylinderSpec,
    layout: CylinderLayout,
}

impl CylindricalMeshBuilder {
    /// Validate `spec` and lay out the profile.
    pub fn new(spec: &CylinderSpec) -> LithoResult<Self> {
        spec.validate()?;
        let tessellation = Tessellation::for_spec(spec);
        for warning in tessellation.warnings() {
            warn!("{}", warning);
        }
        let layout = CylinderLayout::new(spec, tessellation);
        debug!(
            angular = tessellation.angular_segments,
            height = tessellation.height_segments,
            rings = layout.ring_count(),
            "Laid out cylinder profile"
        );
        Ok(Self {
            spec: spec.clone(),
            layout,
        })
    }

    pub fn spec(&self) -> &CylinderSpec {
        &self.spec
    }

    pub fn layout(&self) -> &CylinderLayout {
        &self.layout
    }

    pub fn tessellation(&self) -> &Tessellation {
        self.layout.tessellation()
    }

    fn columns(&self) -> Vec<Column> {
        let spec = &self.spec;
        let n = self.tessellation().angular_segments;
        let coverage = spec.coverage_rad();
        let start = spec.window_start_rad();
        let k = spec.curvature_compensation;

        (0..n)
            .map(|j| {
                let offset = j as f64 * TAU / n as f64;
                let (sin, cos) = (start + offset).sin_cos();
                let window = (offset <= coverage + WINDOW_EPSILON).then(|| {
                    let u = (offset / coverage).min(1.0);
                    let phi = offset - coverage / 2.0;
                    (u, 1.0 + k * (2.0 * phi).cos())
                });
                Column { cos, sin, window }
            })
            .collect()
    }

    /// Outer radius of every column on one relief ring.
    fn relief_radii(
        &self,
        band_row: Option<usize>,
        columns: &[Column],
        interp: &SurfaceInterpolator,
        field: &ThicknessField,
    ) -> LithoResult<Vec<f64>> {
        let spec = &self.spec;
        let inner = spec.inner_radius();
        let plain = inner + spec.wall_thickness_mm;
        let Some(k) = band_row else {
            return Ok(vec![plain; columns.len()]);
        };

        let v = k as f64 / self.tessellation().height_segments as f64;
        let image_row = (1.0 - v) * (field.height() - 1) as f64;
        let last_col = (field.width() - 1) as f64;
        let (min, max) = field.range();

        columns
            .iter()
            .map(|column| match column.window {
                Some((u, compensation)) => {
                    let (row, col) = interp.clamp(image_row, u * last_col);
                    let thickness = interp.sample(row, col)?.clamp(min, max);
                    Ok(inner + thickness * compensation)
                }
                None => Ok(plain),
            })
            .collect()
    }

    fn ring_vertices(
        &self,
        ring: &Ring,
        columns: &[Column],
        interp: &SurfaceInterpolator,
        field: &ThicknessField,
    ) -> LithoResult<Vec<Vertex>> {
        let tag = ring.tag() as u32;
        let radii = match ring.radius {
            RingRadius::Axis => return Ok(vec![Vertex::tagged(0.0, 0.0, ring.z, tag)]),
            RingRadius::Relief(band_row) => self.relief_radii(band_row, columns, interp, field)?,
            RingRadius::Inner => vec![self.spec.inner_radius(); columns.len()],
            RingRadius::Bore(r) => vec![r; columns.len()],
        };
        Ok(columns
            .iter()
            .zip(radii)
            .map(|(c, r)| Vertex::tagged(r * c.cos, r * c.sin, ring.z, tag))
            .collect())
    }

    /// Triangles joining ring `k` to the next ring in the profile.
    fn strip(&self, k: usize, offsets: &[u32]) -> Vec<[u32; 3]> {
        let rings = &self.layout.rings;
        let next = (k + 1) % rings.len();
        let (a, b) = (&rings[k], &rings[next]);
        let (oa, ob) = (offsets[k], offsets[next]);
        let n = self.tessellation().angular_segments as u32;

        let mut faces = Vec::with_capacity(2 * n as usize);
        for j in 0..n {
            let j1 = (j + 1) % n;
            match (a.is_axis(), b.is_axis()) {
                (false, false) => {
                    let (a0, a1) = (oa + j, oa + j1);
                    let (b0, b1) = (ob + j, ob + j1);
                    faces.push([a0, a1, b1]);
                    faces.push([a0, b1, b0]);
                }
                (false, true) => faces.push([oa + j, oa + j1, ob]),
                (true, false) => faces.push([oa, ob + j1, ob + j]),
                (true, true) => break,
            }
        }
        faces
    }

    /// Generate vertices and faces for a thickness field.
    ///
    /// Rings and strips are produced in parallel and concatenated in profile
    /// order, so the output is identical across runs.
    pub fn generate(&self, field: &ThicknessField) -> LithoResult<GeneratedShell> {
        let _timer = OperationTimer::new("generate_cylinder");
        let interp =
            SurfaceInterpolator::from_grid(field.width(), field.height(), field.values().to_vec())?;
        if interp.method() == InterpolationMethod::Bilinear {
            info!(
                width = field.width(),
                height = field.height(),
                "Thickness field is small, sampling bilinearly"
            );
        }

        let columns = self.columns();
        let rings = &self.layout.rings;

        let vertices: Vec<Vec<Vertex>> = rings
            .par_iter()
            .map(|ring| self.ring_vertices(ring, &columns, &interp, field))
            .collect::<LithoResult<_>>()?;

        let offsets = self.layout.offsets();
        let faces: Vec<Vec<[u32; 3]>> = (0..rings.len())
            .into_par_iter()
            .map(|k| self.strip(k, &offsets))
            .collect();

        let mut mesh = Mesh::with_capacity(self.layout.vertex_count(), self.layout.face_count());
        mesh.vertices.extend(vertices.into_iter().flatten());
        mesh.faces.extend(faces.into_iter().flatten());

        log_mesh_stats(&mesh, "generate_cylinder");
        Ok(GeneratedShell {
            mesh,
            interpolation: interp.method(),
        })
    }
}
