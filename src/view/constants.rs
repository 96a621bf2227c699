use crate::style::Color;
use crate::ui::Rect;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

pub const MATERIAL_COUNT: usize = 3;

pub const IDENTITY: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// One UI quad: `world` maps the unit square onto the element rectangle in
/// normalised device coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct UiConstant {
    pub world: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl UiConstant {
    pub fn from_rect(rect: &Rect, viewport: &Rect, color: Color) -> Self {
        Self {
            world: rect_to_ndc(rect, viewport).to_cols_array_2d(),
            color: color.to_rgba_f32(),
        }
    }
}

/// Scale + translate taking (u, v) in [0,1]² to the pixel rectangle, with
/// y pointing down in pixels and up in NDC.
pub fn rect_to_ndc(rect: &Rect, viewport: &Rect) -> Mat4 {
    let sx = 2.0 * rect.width / viewport.width;
    let sy = -2.0 * rect.height / viewport.height;
    let tx = 2.0 * (rect.x - viewport.x) / viewport.width - 1.0;
    let ty = 1.0 - 2.0 * (rect.y - viewport.y) / viewport.height;
    Mat4::from_cols(
        Vec4::new(sx, 0.0, 0.0, 0.0),
        Vec4::new(0.0, sy, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(tx, ty, 0.0, 1.0),
    )
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    pub world: [[f32; 4]; 4],
    pub tex_transform: [[f32; 4]; 4],
}

impl Default for ObjectConstants {
    fn default() -> Self {
        Self {
            world: IDENTITY,
            tex_transform: IDENTITY,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialConstants {
    pub diffuse_albedo: [f32; 4],
    pub fresnel_r0: [f32; 3],
    pub roughness: f32,
    pub mat_transform: [[f32; 4]; 4],
}

impl Default for MaterialConstants {
    fn default() -> Self {
        Self {
            diffuse_albedo: [1.0; 4],
            fresnel_r0: [0.01; 3],
            roughness: 0.25,
            mat_transform: IDENTITY,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PassConstants {
    pub view: [[f32; 4]; 4],
    pub inv_view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub inv_proj: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub eye_pos_w: [f32; 3],
    pub _pad0: f32,
    pub render_target_size: [f32; 2],
    pub inv_render_target_size: [f32; 2],
    pub near_z: f32,
    pub far_z: f32,
    pub total_time: f32,
    pub delta_time: f32,
    pub ambient_light: [f32; 4],
    pub fog_color: [f32; 4],
    pub fog_start: f32,
    pub fog_range: f32,
    pub _pad1: [f32; 2],
    pub materials: [MaterialConstants; MATERIAL_COUNT],
}

impl Default for PassConstants {
    fn default() -> Self {
        Self {
            view: IDENTITY,
            inv_view: IDENTITY,
            proj: IDENTITY,
            inv_proj: IDENTITY,
            view_proj: IDENTITY,
            inv_view_proj: IDENTITY,
            eye_pos_w: [0.0; 3],
            _pad0: 0.0,
            render_target_size: [0.0; 2],
            inv_render_target_size: [0.0; 2],
            near_z: 0.0,
            far_z: 0.0,
            total_time: 0.0,
            delta_time: 0.0,
            ambient_light: [0.0, 0.0, 0.0, 1.0],
            fog_color: [0.7, 0.7, 0.7, 1.0],
            fog_start: 5.0,
            fog_range: 150.0,
            _pad1: [0.0; 2],
            materials: [MaterialConstants::default(); MATERIAL_COUNT],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PassConstants, UiConstant, rect_to_ndc};
    use crate::style::Color;
    use crate::ui::Rect;
    use glam::Vec4;

    #[test]
    fn unit_quad_maps_to_rect_corners() {
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let m = rect_to_ndc(&Rect::new(200.0, 150.0, 400.0, 300.0), &viewport);
        assert_eq!(m * Vec4::new(0.0, 0.0, 0.0, 1.0), Vec4::new(-0.5, 0.5, 0.0, 1.0));
        assert_eq!(m * Vec4::new(1.0, 1.0, 0.0, 1.0), Vec4::new(0.5, -0.5, 0.0, 1.0));

        let full = rect_to_ndc(&viewport, &viewport);
        assert_eq!(full * Vec4::new(0.0, 0.0, 0.0, 1.0), Vec4::new(-1.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn records_have_gpu_layout() {
        assert_eq!(size_of::<UiConstant>(), 80);
        assert_eq!(size_of::<PassConstants>() % 16, 0);
        let record = UiConstant::from_rect(&Rect::new(0.0, 0.0, 1.0, 1.0), &Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE);
        assert_eq!(record.color, [1.0; 4]);
    }
}
