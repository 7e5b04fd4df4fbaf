/// Geometry primitives for 3D rendering
use nalgebra::{Point2, Point3, Vector3};
use std::collections::HashMap;

/// A 3D vertex with position, normal and texture coordinate
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub uv: Point2<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, uv: Point2<f32>) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// A triangle face defined by three vertices, counter-clockwise when seen
/// from the side its normal points to
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }
}

/// A straight line segment, used for outlines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: Point3<f32>,
    pub end: Point3<f32>,
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

/// Per-face layout of the cube: outward normal, then the U and V axes of the
/// face's texture space. `u × v == normal` for every entry.
const CUBE_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Create an axis-aligned cube centered on the origin. Every face maps
    /// the full texture, upright when the face is viewed from outside.
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::with_capacity(12);

        for (normal, u, v) in CUBE_FACES {
            let normal = Vector3::from(normal);
            let u = Vector3::from(u);
            let v = Vector3::from(v);
            let center = Point3::origin() + normal * half;

            let corner = |su: f32, sv: f32| {
                Vertex::new(
                    center + u * (su * half) + v * (sv * half),
                    normal,
                    Point2::new((su + 1.0) / 2.0, (sv + 1.0) / 2.0),
                )
            };
            let bottom_left = corner(-1.0, -1.0);
            let bottom_right = corner(1.0, -1.0);
            let top_right = corner(1.0, 1.0);
            let top_left = corner(-1.0, 1.0);

            mesh.add_triangle(Triangle::new(bottom_left, bottom_right, top_right));
            mesh.add_triangle(Triangle::new(bottom_left, top_right, top_left));
        }

        mesh
    }

    /// Collect the edges that separate faces meeting at more than
    /// `threshold_degrees`, plus edges used by a single triangle.
    /// Diagonals splitting a flat quad are skipped.
    pub fn feature_edges(&self, threshold_degrees: f32) -> Vec<Edge> {
        let threshold_dot = threshold_degrees.to_radians().cos();

        // Keyed by quantized endpoint positions so shared corners merge
        // even when the vertices were built separately.
        let mut seen: HashMap<(QuantizedPoint, QuantizedPoint), EdgeUse> = HashMap::new();
        let mut order = Vec::new();

        for triangle in &self.triangles {
            let normal = triangle.calculate_normal();
            for i in 0..3 {
                let a = triangle.vertices[i].position;
                let b = triangle.vertices[(i + 1) % 3].position;
                let (qa, qb) = (quantize(&a), quantize(&b));
                let key = if qa <= qb { (qa, qb) } else { (qb, qa) };

                match seen.get_mut(&key) {
                    Some(entry) => {
                        if entry.first_normal.dot(&normal) > threshold_dot {
                            entry.smooth = true;
                        }
                    }
                    None => {
                        seen.insert(
                            key,
                            EdgeUse {
                                edge: Edge { start: a, end: b },
                                first_normal: normal,
                                smooth: false,
                            },
                        );
                        order.push(key);
                    }
                }
            }
        }

        order
            .into_iter()
            .filter_map(|key| seen.get(&key))
            .filter(|entry| !entry.smooth)
            .map(|entry| entry.edge)
            .collect()
    }
}

type QuantizedPoint = (i64, i64, i64);

struct EdgeUse {
    edge: Edge,
    first_normal: Vector3<f32>,
    // shared with a face pointing the same way
    smooth: bool,
}

fn quantize(point: &Point3<f32>) -> QuantizedPoint {
    const PRECISION: f32 = 1e4;
    (
        (point.x * PRECISION).round() as i64,
        (point.y * PRECISION).round() as i64,
        (point.z * PRECISION).round() as i64,
    )
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_layout() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.triangles.len(), 12);
        for triangle in &cube.triangles {
            for vertex in &triangle.vertices {
                assert_relative_eq!(vertex.position.x.abs(), 1.0);
                assert_relative_eq!(vertex.position.y.abs(), 1.0);
                assert_relative_eq!(vertex.position.z.abs(), 1.0);
                assert!((0.0..=1.0).contains(&vertex.uv.x));
                assert!((0.0..=1.0).contains(&vertex.uv.y));
            }
        }
    }

    #[test]
    fn test_cube_winding_faces_outward() {
        let cube = Mesh::cube(1.0);
        for triangle in &cube.triangles {
            let computed = triangle.calculate_normal();
            let declared = triangle.vertices[0].normal;
            assert_relative_eq!(computed.dot(&declared), 1.0, epsilon = 1e-5);

            let centroid = triangle
                .vertices
                .iter()
                .fold(Vector3::zeros(), |acc, v| acc + v.position.coords)
                / 3.0;
            assert!(centroid.dot(&computed) > 0.0);
        }
    }

    #[test]
    fn test_front_face_uv_is_upright() {
        let cube = Mesh::cube(2.0);
        let front = cube
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter())
            .filter(|v| v.normal.z > 0.5);
        for vertex in front {
            // u grows with x, v grows with y on the +Z face
            assert_relative_eq!(vertex.uv.x, (vertex.position.x + 1.0) / 2.0);
            assert_relative_eq!(vertex.uv.y, (vertex.position.y + 1.0) / 2.0);
        }
    }

    #[test]
    fn test_cube_feature_edges() {
        let cube = Mesh::cube(2.0);
        let edges = cube.feature_edges(1.0);
        assert_eq!(edges.len(), 12);
        for edge in &edges {
            // every cube edge is axis aligned with length equal to the size
            assert_relative_eq!((edge.end - edge.start).norm(), 2.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_single_triangle_edges_are_boundaries() {
        let mut mesh = Mesh::new();
        let n = Vector3::z();
        mesh.add_triangle(Triangle::new(
            Vertex::new(Point3::new(0.0, 0.0, 0.0), n, Point2::origin()),
            Vertex::new(Point3::new(1.0, 0.0, 0.0), n, Point2::origin()),
            Vertex::new(Point3::new(0.0, 1.0, 0.0), n, Point2::origin()),
        ));
        assert_eq!(mesh.feature_edges(1.0).len(), 3);
    }
}
