//! Camera models

use nalgebra::{Vector2, Vector3};

/// Projection model used by a frame.
///
/// Points handed to `project` are already in the camera frame with z >= 0.
/// At z == 0 the pixel may be non-finite; frames reject such pixels.
pub trait Camera: Send + Sync {
    fn project(&self, point_cam: &Vector3<f64>) -> Vector2<f64>;

    fn is_inside_image(&self, pixel: &Vector2<i32>) -> bool;

    fn width(&self) -> usize;

    fn height(&self) -> usize;
}

/// Pinhole camera without distortion
///
///   u = fx * X/Z + cx
///   v = fy * Y/Z + cy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeCamera {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    pub width: usize,
    pub height: usize,
    /// Pixels along each edge treated as outside the image
    pub border: usize,
}

impl PinholeCamera {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64, width: usize, height: usize) -> Self {
        Self { fx, fy, cx, cy, width, height, border: 0 }
    }

    /// Square pixels and principal point at the image center
    pub fn simple(focal_length: f64, width: usize, height: usize) -> Self {
        Self::new(
            focal_length,
            focal_length,
            width as f64 * 0.5,
            height as f64 * 0.5,
            width,
            height,
        )
    }

    pub fn with_border(mut self, border: usize) -> Self {
        self.border = border;
        self
    }

    /// Back-project a pixel to the 3D point at depth `z`
    pub fn unproject(&self, pixel: &Vector2<f64>, z: f64) -> Vector3<f64> {
        Vector3::new(
            (pixel.x - self.cx) * z / self.fx,
            (pixel.y - self.cy) * z / self.fy,
            z,
        )
    }
}

impl Camera for PinholeCamera {
    fn project(&self, point_cam: &Vector3<f64>) -> Vector2<f64> {
        let inv_z = 1.0 / point_cam.z;
        Vector2::new(
            self.fx * point_cam.x * inv_z + self.cx,
            self.fy * point_cam.y * inv_z + self.cy,
        )
    }

    fn is_inside_image(&self, pixel: &Vector2<i32>) -> bool {
        let b = self.border as i64;
        let (u, v) = (pixel.x as i64, pixel.y as i64);
        u >= b && v >= b && u < self.width as i64 - b && v < self.height as i64 - b
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_principal_axis() {
        let cam = PinholeCamera::simple(500.0, 640, 480);
        let px = cam.project(&Vector3::new(0.0, 0.0, 3.0));
        assert_eq!(px, Vector2::new(320.0, 240.0));
    }

    #[test]
    fn test_unproject_inverts_project() {
        let cam = PinholeCamera::new(420.0, 410.0, 300.0, 200.0, 640, 480);
        let p = Vector3::new(0.4, -0.3, 2.5);
        let back = cam.unproject(&cam.project(&p), p.z);
        assert!((back - p).norm() < 1e-12);
    }

    #[test]
    fn test_inside_image_edges() {
        let cam = PinholeCamera::simple(500.0, 640, 480);
        assert!(cam.is_inside_image(&Vector2::new(0, 0)));
        assert!(cam.is_inside_image(&Vector2::new(639, 479)));
        assert!(!cam.is_inside_image(&Vector2::new(-1, 10)));
        assert!(!cam.is_inside_image(&Vector2::new(640, 10)));
        assert!(!cam.is_inside_image(&Vector2::new(10, 480)));
    }

    #[test]
    fn test_border_shrinks_image() {
        let cam = PinholeCamera::simple(500.0, 640, 480).with_border(8);
        assert!(!cam.is_inside_image(&Vector2::new(7, 100)));
        assert!(cam.is_inside_image(&Vector2::new(8, 100)));
        assert!(!cam.is_inside_image(&Vector2::new(632, 100)));
    }
}
