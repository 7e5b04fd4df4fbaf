/// Software rasterizer writing RGBA frames
use nalgebra::{Matrix4, Point3};

use crate::color::Color;
use crate::geometry::{Edge, Triangle};
use crate::projection::{Camera, ScreenPoint};
use crate::scene::{Material, Scene};
use crate::transform::Transform;

/// Outline fragments win depth ties against faces up to this relative slack
const LINE_DEPTH_BIAS: f32 = 1e-3;

/// RGBA8 color plane plus a view-depth buffer
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    color: Vec<u8>,
    depth: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            color: vec![0; size * 4],
            depth: vec![f32::INFINITY; size],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA bytes, ready for a canvas `ImageData`
    pub fn pixels(&self) -> &[u8] {
        &self.color
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.color[i],
            self.color[i + 1],
            self.color[i + 2],
            self.color[i + 3],
        ]
    }

    pub fn clear(&mut self, background: Color) {
        let rgba = background.to_rgba();
        for px in self.color.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        self.depth.fill(f32::INFINITY);
    }

    fn plot(&mut self, x: usize, y: usize, depth: f32, rgba: [u8; 4], bias: f32) {
        let idx = y * self.width as usize + x;
        if depth < self.depth[idx] * (1.0 + bias) {
            self.depth[idx] = self.depth[idx].min(depth);
            self.color[idx * 4..idx * 4 + 4].copy_from_slice(&rgba);
        }
    }
}

/// Draws a [`Scene`] from a [`Camera`] into a [`Framebuffer`]
pub struct Rasterizer {
    framebuffer: Framebuffer,
}

impl Rasterizer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            framebuffer: Framebuffer::new(width, height),
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.framebuffer = Framebuffer::new(width, height);
    }

    pub fn render(&mut self, scene: &Scene, camera: &Camera) -> &Framebuffer {
        self.framebuffer.clear(scene.background);

        let view = camera.view_matrix();
        let projection = camera.projection_matrix();

        let model = Transform::rotation_matrix(&scene.cube.rotation);
        let mvp = Transform::mvp_matrix(&model, &view, &projection);
        for triangle in &scene.cube.mesh.triangles {
            self.render_triangle(triangle, &scene.cube.material, &mvp, camera);
        }

        if let Some(outline) = &scene.outline {
            let model = Transform::rotation_matrix(&outline.rotation);
            let mvp = Transform::mvp_matrix(&model, &view, &projection);
            let color = outline.color.to_rgba();
            for edge in &outline.edges {
                self.render_edge(edge, color, &mvp, camera);
            }
        }

        &self.framebuffer
    }

    fn project(&self, point: &Point3<f32>, mvp: &Matrix4<f32>) -> Option<ScreenPoint> {
        Camera::project_to_screen(
            point,
            mvp,
            self.framebuffer.width,
            self.framebuffer.height,
        )
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        material: &Material,
        mvp: &Matrix4<f32>,
        camera: &Camera,
    ) {
        let mut screen = [ScreenPoint {
            x: 0.0,
            y: 0.0,
            depth: 0.0,
        }; 3];
        for (slot, vertex) in screen.iter_mut().zip(&triangle.vertices) {
            match self.project(&vertex.position, mvp) {
                Some(point) => *slot = point,
                None => return, // crosses the camera plane
            }
        }
        let [v0, v1, v2] = screen;

        // Counter-clockwise in NDC is clockwise once y points down
        let area = (v1.x - v0.x) * (v2.y - v0.y) - (v2.x - v0.x) * (v1.y - v0.y);
        if area >= 0.0 {
            return;
        }

        let inv_w = [1.0 / v0.depth, 1.0 / v1.depth, 1.0 / v2.depth];
        let uv = triangle.vertices.map(|v| v.uv);

        let Some((min_x, max_x, min_y, max_y)) = self.bounds(&screen) else {
            return;
        };

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                // 1/w is affine in screen space; attributes divided by w are too
                let one_over_w = w0 * inv_w[0] + w1 * inv_w[1] + w2 * inv_w[2];
                let depth = 1.0 / one_over_w;
                if depth < camera.near || depth > camera.far {
                    continue;
                }
                let u = depth
                    * (w0 * uv[0].x * inv_w[0] + w1 * uv[1].x * inv_w[1] + w2 * uv[2].x * inv_w[2]);
                let v = depth
                    * (w0 * uv[0].y * inv_w[0] + w1 * uv[1].y * inv_w[1] + w2 * uv[2].y * inv_w[2]);

                self.framebuffer
                    .plot(x as usize, y as usize, depth, material.shade(u, v), 0.0);
            }
        }
    }

    fn render_edge(&mut self, edge: &Edge, rgba: [u8; 4], mvp: &Matrix4<f32>, camera: &Camera) {
        let (Some(a), Some(b)) = (self.project(&edge.start, mvp), self.project(&edge.end, mvp))
        else {
            return;
        };

        let (width, height) = (self.framebuffer.width as f32, self.framebuffer.height as f32);
        // Endpoints near the camera plane project far outside the frame
        let Some((t0, t1)) = clip_to_viewport(&a, &b, width, height) else {
            return;
        };

        let span = (b.x - a.x).abs().max((b.y - a.y).abs()) * (t1 - t0);
        let steps = span.ceil().max(1.0) as usize;
        let (inv_a, inv_b) = (1.0 / a.depth, 1.0 / b.depth);

        for i in 0..=steps {
            let t = t0 + (t1 - t0) * (i as f32 / steps as f32);
            let x = a.x + (b.x - a.x) * t;
            let y = a.y + (b.y - a.y) * t;
            if x < 0.0 || y < 0.0 || x >= width || y >= height {
                continue;
            }
            let depth = 1.0 / (inv_a + (inv_b - inv_a) * t);
            if depth < camera.near || depth > camera.far {
                continue;
            }
            self.framebuffer
                .plot(x as usize, y as usize, depth, rgba, LINE_DEPTH_BIAS);
        }
    }

    /// Pixel bounding box clipped to the framebuffer, `None` when off screen
    fn bounds(&self, points: &[ScreenPoint; 3]) -> Option<(i32, i32, i32, i32)> {
        let min_x = points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = points.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);

        let min_x = (min_x.floor() as i32).max(0);
        let max_x = (max_x.ceil() as i32).min(self.framebuffer.width as i32 - 1);
        let min_y = (min_y.floor() as i32).max(0);
        let max_y = (max_y.ceil() as i32).min(self.framebuffer.height as i32 - 1);
        (min_x <= max_x && min_y <= max_y).then_some((min_x, max_x, min_y, max_y))
    }
}

/// Liang-Barsky: the parameter range of `a -> b` that lies inside
/// `[0, width] x [0, height]`, `None` when the segment misses it
fn clip_to_viewport(
    a: &ScreenPoint,
    b: &ScreenPoint,
    width: f32,
    height: f32,
) -> Option<(f32, f32)> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    for (p, q) in [(-dx, a.x), (dx, width - a.x), (-dy, a.y), (dy, height - a.y)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((t0, t1))
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
