use glam::{Mat4, Vec2, Vec3};

/// Camera hovering straight above the map, panning over it and zooming by
/// changing its height.
#[derive(Debug, Clone, PartialEq)]
pub struct TopDownCamera {
    pan: Vec2,
    radius: f32,
    min_radius: f32,
    max_radius: f32,
    pan_limit: f32,
    fov_y: f32,
    near_z: f32,
    far_z: f32,
}

impl TopDownCamera {
    pub fn new(radius: f32, radius_range: (f32, f32), pan_limit: f32) -> Self {
        let (min_radius, max_radius) = radius_range;
        Self {
            pan: Vec2::ZERO,
            radius: radius.clamp(min_radius, max_radius),
            min_radius,
            max_radius,
            pan_limit: pan_limit.abs(),
            fov_y: 0.25 * std::f32::consts::PI,
            near_z: 1.0,
            far_z: 1000.0,
        }
    }

    pub fn with_projection(mut self, fov_y: f32, near_z: f32, far_z: f32) -> Self {
        self.fov_y = fov_y;
        self.near_z = near_z;
        self.far_z = far_z;
        self
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn near_z(&self) -> f32 {
        self.near_z
    }

    pub fn far_z(&self) -> f32 {
        self.far_z
    }

    /// `direction` is in map axes (x right, y forward), usually each
    /// component in -1..=1. Speed scales with height.
    pub fn pan_by(&mut self, direction: Vec2, dt: f32) {
        let moved = self.pan + direction * dt * self.radius;
        self.pan = moved.clamp(Vec2::splat(-self.pan_limit), Vec2::splat(self.pan_limit));
    }

    /// Right-drag zoom: every pixel is 0.2 world units.
    pub fn zoom_by_drag(&mut self, dx: f32, dy: f32) {
        let delta = 0.2 * dx - 0.2 * dy;
        self.radius = (self.radius + delta).clamp(self.min_radius, self.max_radius);
    }

    /// Nudged slightly toward -z so the look direction is never parallel to
    /// the up vector.
    pub fn eye(&self) -> Vec3 {
        Vec3::new(self.pan.x, self.radius, self.pan.y - 0.000001 * self.radius)
    }

    pub fn target(&self) -> Vec3 {
        Vec3::new(self.pan.x, 0.0, self.pan.y)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_lh(self.eye(), self.target(), Vec3::Y)
    }

    pub fn proj(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_lh(self.fov_y, aspect_ratio, self.near_z, self.far_z)
    }

    pub fn view_proj(&self, aspect_ratio: f32) -> Mat4 {
        self.proj(aspect_ratio) * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::TopDownCamera;
    use glam::{Vec2, Vec3, Vec4};

    #[test]
    fn pan_and_zoom_are_clamped() {
        let mut camera = TopDownCamera::new(50.0, (5.0, 150.0), 20.0);
        camera.pan_by(Vec2::new(1.0, 0.0), 0.1);
        assert_eq!(camera.pan(), Vec2::new(5.0, 0.0));
        camera.pan_by(Vec2::new(10.0, -10.0), 1.0);
        assert_eq!(camera.pan(), Vec2::new(20.0, -20.0));

        camera.zoom_by_drag(100.0, -50.0);
        assert_eq!(camera.radius(), 80.0);
        camera.zoom_by_drag(-1000.0, 0.0);
        assert_eq!(camera.radius(), 5.0);
    }

    #[test]
    fn map_centre_projects_to_screen_centre() {
        let camera = TopDownCamera::new(50.0, (5.0, 150.0), 20.0);
        let clip = camera.view_proj(4.0 / 3.0) * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4, "{ndc:?}");
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
        assert_eq!(camera.eye().y, 50.0);
        assert_eq!(camera.target(), Vec3::ZERO);
    }
}
