//! Planar triangulations for linear interpolation.
//!
//! Raster samples are split cell by cell into two triangles each. Scattered
//! samples are triangulated with the Bowyer–Watson Delaunay algorithm, which
//! is quadratic in the worst case and meant for the modest point counts of
//! survey-scale elevation data.
//!
//! Triangles are indexed in an R-tree of bounding boxes so that point
//! location only tests the few triangles whose box contains the query.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// Barycentric tolerance for points on triangle edges.
const EDGE_TOL: f64 = 1e-10;

/// Bounding box of one triangle, stored in the R-tree.
#[derive(Clone, Debug)]
struct TriangleEnvelope {
    triangle: usize,
    min: [f64; 2],
    max: [f64; 2],
}

impl TriangleEnvelope {
    fn new(triangle: usize, corners: &[[f64; 2]; 3]) -> Self {
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min[0] = min[0].min(c[0]);
            min[1] = min[1].min(c[1]);
            max[0] = max[0].max(c[0]);
            max[1] = max[1].max(c[1]);
        }
        Self { triangle, min, max }
    }
}

impl RTreeObject for TriangleEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for TriangleEnvelope {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = (self.min[0] - point[0]).max(point[0] - self.max[0]).max(0.0);
        let dy = (self.min[1] - point[1]).max(point[1] - self.max[1]).max(0.0);
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        point[0] >= self.min[0]
            && point[0] <= self.max[0]
            && point[1] >= self.min[1]
            && point[1] <= self.max[1]
    }
}

/// Signed double area of triangle (a, b, c); positive when counter-clockwise.
#[inline]
fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Triangles over a set of sample points.
///
/// ```
/// use modem_mesh::interp::Triangulation;
///
/// // Unit square raster, 2 x 2 samples
/// let points = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
/// let tri = Triangulation::structured(points, 2, 2);
/// assert_eq!(tri.n_triangles(), 2);
///
/// // z = x + 2y is reproduced exactly
/// let values = [0.0, 1.0, 2.0, 3.0];
/// let z = tri.interpolate(&values, [0.25, 0.5]).unwrap();
/// assert!((z - 1.25).abs() < 1e-12);
/// assert!(tri.interpolate(&values, [2.0, 0.5]).is_none());
/// ```
pub struct Triangulation {
    points: Vec<[f64; 2]>,
    triangles: Vec<[usize; 3]>,
    index: RTree<TriangleEnvelope>,
}

impl Triangulation {
    fn from_triangles(points: Vec<[f64; 2]>, triangles: Vec<[usize; 3]>) -> Self {
        let envelopes = triangles
            .iter()
            .enumerate()
            .map(|(i, t)| TriangleEnvelope::new(i, &[points[t[0]], points[t[1]], points[t[2]]]))
            .collect();
        Self {
            points,
            triangles,
            index: RTree::bulk_load(envelopes),
        }
    }

    /// Triangulate a row-major raster of `rows x cols` points.
    ///
    /// Each cell is split along its (r, c)–(r+1, c+1) diagonal. Degenerate
    /// triangles (zero area) are dropped.
    pub fn structured(points: Vec<[f64; 2]>, rows: usize, cols: usize) -> Self {
        let mut triangles = Vec::with_capacity(2 * rows.saturating_sub(1) * cols.saturating_sub(1));
        for r in 0..rows.saturating_sub(1) {
            for c in 0..cols.saturating_sub(1) {
                let a = r * cols + c;
                let b = a + 1;
                let d = a + cols;
                let e = d + 1;
                for tri in [[a, b, e], [a, e, d]] {
                    if orient(points[tri[0]], points[tri[1]], points[tri[2]]).abs() > 0.0 {
                        triangles.push(tri);
                    }
                }
            }
        }
        Self::from_triangles(points, triangles)
    }

    /// Delaunay triangulation of scattered points (Bowyer–Watson).
    ///
    /// Duplicate points are ignored. Fewer than three non-collinear points
    /// give an empty triangulation.
    pub fn delaunay(points: Vec<[f64; 2]>) -> Self {
        let n = points.len();
        if n < 3 {
            return Self::from_triangles(points, Vec::new());
        }

        let (mut min, mut max) = (points[0], points[0]);
        for p in &points {
            min[0] = min[0].min(p[0]);
            min[1] = min[1].min(p[1]);
            max[0] = max[0].max(p[0]);
            max[1] = max[1].max(p[1]);
        }
        let span = (max[0] - min[0]).max(max[1] - min[1]).max(1.0);
        let mid = [(min[0] + max[0]) / 2.0, (min[1] + max[1]) / 2.0];

        // Working vertex list: samples followed by the super-triangle
        let mut verts = points.clone();
        verts.push([mid[0] - 20.0 * span, mid[1] - span]);
        verts.push([mid[0], mid[1] + 20.0 * span]);
        verts.push([mid[0] + 20.0 * span, mid[1] - span]);

        let mut working: Vec<Circumscribed> = vec![Circumscribed::new(&verts, [n, n + 1, n + 2])];

        let mut seen: Vec<[f64; 2]> = Vec::with_capacity(n);
        for (i, &p) in points.iter().enumerate() {
            if seen.iter().any(|q| q[0] == p[0] && q[1] == p[1]) {
                continue;
            }
            seen.push(p);

            let (bad, good): (Vec<Circumscribed>, Vec<Circumscribed>) =
                working.into_iter().partition(|t| t.contains(p));
            working = good;

            // Cavity boundary: edges used by exactly one bad triangle
            let mut edges: Vec<[usize; 2]> = Vec::with_capacity(bad.len() * 3);
            for t in &bad {
                for edge in t.edges() {
                    if let Some(pos) = edges
                        .iter()
                        .position(|e| *e == edge || (e[0] == edge[1] && e[1] == edge[0]))
                    {
                        edges.swap_remove(pos);
                    } else {
                        edges.push(edge);
                    }
                }
            }

            for [a, b] in edges {
                if orient(verts[a], verts[b], p).abs() > 0.0 {
                    working.push(Circumscribed::new(&verts, [a, b, i]));
                }
            }
        }

        let triangles = working
            .into_iter()
            .map(|t| t.vertices)
            .filter(|t| t.iter().all(|&v| v < n))
            .collect();
        Self::from_triangles(points, triangles)
    }

    #[inline]
    pub fn n_triangles(&self) -> usize {
        self.triangles.len()
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Triangle containing `point` and its barycentric weights.
    pub fn locate(&self, point: [f64; 2]) -> Option<(usize, [f64; 3])> {
        self.index
            .locate_all_at_point(&point)
            .find_map(|env| {
                let t = self.triangles[env.triangle];
                let (a, b, c) = (self.points[t[0]], self.points[t[1]], self.points[t[2]]);
                let area = orient(a, b, c);
                if area == 0.0 {
                    return None;
                }
                let wa = orient(b, c, point) / area;
                let wb = orient(c, a, point) / area;
                let wc = 1.0 - wa - wb;
                if wa >= -EDGE_TOL && wb >= -EDGE_TOL && wc >= -EDGE_TOL {
                    Some((env.triangle, [wa, wb, wc]))
                } else {
                    None
                }
            })
    }

    /// Linear interpolation of per-point `values`; `None` outside the hull.
    pub fn interpolate(&self, values: &[f64], point: [f64; 2]) -> Option<f64> {
        let (tri, w) = self.locate(point)?;
        let t = self.triangles[tri];
        Some(w[0] * values[t[0]] + w[1] * values[t[1]] + w[2] * values[t[2]])
    }
}

/// Triangle with its cached circumcircle.
struct Circumscribed {
    vertices: [usize; 3],
    center: [f64; 2],
    radius_2: f64,
}

impl Circumscribed {
    fn new(verts: &[[f64; 2]], vertices: [usize; 3]) -> Self {
        let (a, b, c) = (verts[vertices[0]], verts[vertices[1]], verts[vertices[2]]);
        let d = 2.0 * orient(a, b, c);
        let (a2, b2, c2) = (
            a[0] * a[0] + a[1] * a[1],
            b[0] * b[0] + b[1] * b[1],
            c[0] * c[0] + c[1] * c[1],
        );
        let ux = (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d;
        let uy = (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d;
        let radius_2 = (a[0] - ux).powi(2) + (a[1] - uy).powi(2);
        Self {
            vertices,
            center: [ux, uy],
            radius_2,
        }
    }

    fn contains(&self, p: [f64; 2]) -> bool {
        let d2 = (p[0] - self.center[0]).powi(2) + (p[1] - self.center[1]).powi(2);
        d2 < self.radius_2
    }

    fn edges(&self) -> [[usize; 2]; 3] {
        let [a, b, c] = self.vertices;
        [[a, b], [b, c], [c, a]]
    }
}

/// Indexed sample point for nearest-neighbour queries.
#[derive(Clone, Debug)]
pub(crate) struct SamplePoint {
    pub index: usize,
    pub xy: [f64; 2],
}

impl RTreeObject for SamplePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.xy)
    }
}

impl PointDistance for SamplePoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.xy[0] - point[0];
        let dy = self.xy[1] - point[1];
        dx * dx + dy * dy
    }
}

/// R-tree over sample points.
pub(crate) fn point_index(points: &[[f64; 2]]) -> RTree<SamplePoint> {
    RTree::bulk_load(
        points
            .iter()
            .enumerate()
            .map(|(index, &xy)| SamplePoint { index, xy })
            .collect(),
    )
}
