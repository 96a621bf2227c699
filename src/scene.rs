//! Materials and render items drawn over the terrain grid.

use crate::view::{
    BufferOverflow, MATERIAL_COUNT, MaterialConstants, ObjectConstants, PassConstants, UploadBuffer,
};
use glam::{Mat4, Vec3, Vec4};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Grass,
    Water,
    Wirefence,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; MATERIAL_COUNT] = [Self::Grass, Self::Water, Self::Wirefence];

    /// Slot in the pass constants' material array.
    pub const fn cb_index(self) -> usize {
        match self {
            Self::Grass => 0,
            Self::Water => 1,
            Self::Wirefence => 2,
        }
    }

    pub const fn srv_index(self) -> usize {
        self.cb_index()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    pub diffuse_albedo: Vec4,
    pub fresnel_r0: Vec3,
    pub roughness: f32,
    pub transform: Mat4,
    dirty_frames: usize,
}

impl Material {
    fn new(kind: MaterialKind, frame_resource_count: usize) -> Self {
        let (diffuse_albedo, fresnel_r0, roughness) = match kind {
            MaterialKind::Grass => (Vec4::ONE, Vec3::splat(0.01), 0.125),
            MaterialKind::Water => (Vec4::new(1.0, 1.0, 1.0, 0.5), Vec3::splat(0.1), 0.0),
            MaterialKind::Wirefence => (Vec4::ONE, Vec3::splat(0.1), 0.25),
        };
        Self {
            kind,
            diffuse_albedo,
            fresnel_r0,
            roughness,
            transform: Mat4::IDENTITY,
            dirty_frames: frame_resource_count,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_frames > 0
    }

    pub fn to_constants(&self) -> MaterialConstants {
        MaterialConstants {
            diffuse_albedo: self.diffuse_albedo.to_array(),
            fresnel_r0: self.fresnel_r0.to_array(),
            roughness: self.roughness,
            mat_transform: self.transform.to_cols_array_2d(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderItemKind {
    Ground,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    pub kind: RenderItemKind,
    pub world: Mat4,
    pub tex_transform: Mat4,
    pub obj_cb_index: usize,
    pub material: MaterialKind,
    pub index_count: u32,
    pub start_index: u32,
    pub base_vertex: i32,
    dirty_frames: usize,
}

impl RenderItem {
    pub fn is_dirty(&self) -> bool {
        self.dirty_frames > 0
    }
}

/// Every material and render item carries a countdown of frame resources
/// that still hold stale constants; a change resets it to the number of
/// frame resources.
#[derive(Debug, Clone)]
pub struct Scene {
    materials: [Material; MATERIAL_COUNT],
    items: Vec<RenderItem>,
    frame_resource_count: usize,
}

impl Scene {
    pub fn new(frame_resource_count: usize, grid_index_count: u32) -> Self {
        let ground = RenderItem {
            kind: RenderItemKind::Ground,
            world: Mat4::IDENTITY,
            tex_transform: Mat4::from_scale(Vec3::new(5.0, 5.0, 1.0)),
            obj_cb_index: 0,
            material: MaterialKind::Water,
            index_count: grid_index_count,
            start_index: 0,
            base_vertex: 0,
            dirty_frames: frame_resource_count,
        };
        Self {
            materials: MaterialKind::ALL.map(|kind| Material::new(kind, frame_resource_count)),
            items: vec![ground],
            frame_resource_count,
        }
    }

    pub fn material(&self, kind: MaterialKind) -> &Material {
        &self.materials[kind.cb_index()]
    }

    pub fn items(&self) -> &[RenderItem] {
        &self.items
    }

    pub fn item(&self, kind: RenderItemKind) -> Option<&RenderItem> {
        self.items.iter().find(|item| item.kind == kind)
    }

    pub fn set_item_world(&mut self, kind: RenderItemKind, world: Mat4) {
        let count = self.frame_resource_count;
        if let Some(item) = self.items.iter_mut().find(|item| item.kind == kind) {
            item.world = world;
            item.dirty_frames = count;
        }
    }

    /// Scrolls the water texture; offsets wrap back into `[0, 1)`.
    pub fn animate_materials(&mut self, dt: f32) {
        let water = &mut self.materials[MaterialKind::Water.cb_index()];
        let mut offset = water.transform.w_axis;
        offset.x += 0.1 * dt;
        offset.y += 0.02 * dt;
        if offset.x >= 1.0 {
            offset.x -= 1.0;
        }
        if offset.y >= 1.0 {
            offset.y -= 1.0;
        }
        water.transform.w_axis = offset;
        water.dirty_frames = self.frame_resource_count;
    }

    /// Writes object constants of dirty items into this frame's buffer.
    pub fn update_object_constants(
        &mut self,
        object_cb: &mut UploadBuffer<ObjectConstants>,
    ) -> Result<usize, BufferOverflow> {
        let mut written = 0;
        for item in self.items.iter_mut().filter(|item| item.dirty_frames > 0) {
            let constants = ObjectConstants {
                world: item.world.to_cols_array_2d(),
                tex_transform: item.tex_transform.to_cols_array_2d(),
            };
            object_cb.copy_data(item.obj_cb_index, &constants)?;
            item.dirty_frames -= 1;
            written += 1;
        }
        Ok(written)
    }

    /// Copies dirty materials into the persistent pass constants.
    pub fn update_material_constants(&mut self, pass: &mut PassConstants) -> usize {
        let mut written = 0;
        for material in self.materials.iter_mut().filter(|m| m.dirty_frames > 0) {
            pass.materials[material.kind.cb_index()] = material.to_constants();
            material.dirty_frames -= 1;
            written += 1;
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::{MaterialKind, RenderItemKind, Scene};
    use crate::view::{ObjectConstants, PassConstants, UploadBuffer};
    use glam::Mat4;

    #[test]
    fn water_scrolls_and_wraps() {
        let mut scene = Scene::new(3, 6);
        for _ in 0..4 {
            scene.animate_materials(3.0);
        }
        let offset = scene.material(MaterialKind::Water).transform.w_axis;
        assert!((offset.x - 0.2).abs() < 1e-4, "{offset:?}");
        assert!((offset.y - 0.24).abs() < 1e-4, "{offset:?}");
        assert_eq!(scene.material(MaterialKind::Grass).transform, Mat4::IDENTITY);
    }

    #[test]
    fn dirty_items_are_written_once_per_frame_resource() {
        let mut scene = Scene::new(3, 6);
        let mut cb = UploadBuffer::<ObjectConstants>::new(4, true);
        let writes: Vec<usize> = (0..4)
            .map(|_| scene.update_object_constants(&mut cb).unwrap())
            .collect();
        assert_eq!(writes, [1, 1, 1, 0]);
        let ground = cb.read(0).unwrap();
        assert_eq!(ground.tex_transform[0][0], 5.0);

        scene.set_item_world(RenderItemKind::Ground, Mat4::from_translation(glam::Vec3::X));
        assert!(scene.item(RenderItemKind::Ground).unwrap().is_dirty());
        assert_eq!(scene.update_object_constants(&mut cb).unwrap(), 1);
    }

    #[test]
    fn materials_land_in_pass_constants() {
        let mut scene = Scene::new(2, 6);
        let mut pass = PassConstants::default();
        assert_eq!(scene.update_material_constants(&mut pass), 3);
        assert_eq!(pass.materials[1].diffuse_albedo, [1.0, 1.0, 1.0, 0.5]);
        assert_eq!(pass.materials[0].roughness, 0.125);
        assert_eq!(scene.update_material_constants(&mut pass), 3);
        assert_eq!(scene.update_material_constants(&mut pass), 0);

        scene.animate_materials(0.5);
        assert_eq!(scene.update_material_constants(&mut pass), 1);
        assert_eq!(pass.materials[1].mat_transform[3][0], 0.05);
    }
}
