// Perspective camera looking down -Z, plus the ray and frustum maths used for picking and
// video gating. Conventions follow WebGL: clip space z in [-w, w], NDC y up.

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};

use crate::types::{CameraSettings, Viewport};

/// Camera placed at `(0, y, distance)`, optionally tilted by pointer perspective.
#[derive(Debug, Clone)]
pub struct Camera {
    settings: CameraSettings,
    viewport: Viewport,
    fov_deg: f32,
    aspect: f32,
    /// Lateral offset, moved to reveal the contact section.
    pub y: f32,
    /// Rotation about X and Y in radians.
    pub tilt: Vec2,
}

impl Camera {
    pub fn new(settings: CameraSettings, viewport: Viewport) -> Self {
        let mut camera = Camera {
            settings,
            viewport,
            fov_deg: 0.0,
            aspect: 1.0,
            y: 0.0,
            tilt: Vec2::ZERO,
        };
        camera.resize(viewport.width, viewport.height);
        camera
    }

    /// Recompute field of view so one world unit maps to one pixel at the subject distance.
    pub fn resize(&mut self, width: f32, height: f32) {
        let width = width.max(1.0);
        let height = height.max(1.0);
        self.viewport.width = width;
        self.viewport.height = height;
        self.fov_deg = (2.0 * (height / 2.0 / self.settings.distance).atan()).to_degrees();
        self.aspect = width / height;
    }

    pub fn fov(&self) -> f32 {
        self.fov_deg
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, self.y, self.settings.distance)
    }

    pub fn view(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.tilt.x, self.tilt.y, 0.0);
        Mat4::from_rotation_translation(rotation, self.position()).inverse()
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_deg.to_radians(),
            self.aspect,
            self.settings.near,
            self.settings.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    pub fn frustum(&self) -> Frustum {
        Frustum::from_matrix(&self.view_projection())
    }

    /// Convert a pointer position in CSS pixels to normalized device coordinates.
    pub fn to_ndc(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(
            (x / self.viewport.width) * 2.0 - 1.0,
            -(y / self.viewport.height) * 2.0 + 1.0,
        )
    }

    /// Ray from the near plane through `ndc`.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(Vec3::new(ndc.x, ndc.y, -1.0));
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray {
            origin: near,
            direction: (far - near).normalize_or_zero(),
            max_distance: near.distance(far),
        }
    }
}

/// Half-line used for pointer picking.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub max_distance: f32,
}

impl Ray {
    /// Distance to an axis-aligned quad facing +Z, if the ray passes through it.
    pub fn intersect_quad(&self, center: Vec3, size: Vec2) -> Option<f32> {
        if self.direction.z.abs() < f32::EPSILON {
            return None;
        }
        let t = (center.z - self.origin.z) / self.direction.z;
        if t < 0.0 || t > self.max_distance {
            return None;
        }
        let hit = self.origin + self.direction * t;
        let half = size / 2.0;
        if (hit.x - center.x).abs() <= half.x && (hit.y - center.y).abs() <= half.y {
            Some(t)
        } else {
            None
        }
    }
}

/// Six clip planes extracted from a view-projection matrix.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    pub fn from_matrix(m: &Mat4) -> Self {
        let (r0, r1, r2, r3) = (m.row(0), m.row(1), m.row(2), m.row(3));
        let planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r3 + r2, r3 - r2].map(|p| {
            let len = p.truncate().length();
            if len > 0.0 {
                p / len
            } else {
                p
            }
        });
        Frustum { planes }
    }

    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|p| p.truncate().dot(center) + p.w >= -radius)
    }
}
