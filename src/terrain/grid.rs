use crate::view::{BufferOverflow, UploadBuffer};
use bytemuck::{Pod, Zeroable};

pub const GRID_SIZE: u32 = 256;
pub const GRID_VERTEX_COUNT: usize = (GRID_SIZE * GRID_SIZE) as usize;
pub const GRID_INDEX_COUNT: usize = ((GRID_SIZE - 1) * (GRID_SIZE - 1) * 6) as usize;
pub const WEIGHT_CHANNELS: usize = 8;

/// Terrain vertex as laid out in the vertex buffer (72 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertexForMap {
    pub x: u32,
    pub y: u32,
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub tex_c: [f32; 2],
    pub weights: [f32; WEIGHT_CHANNELS],
}

impl VertexForMap {
    fn new(x: u32, y: u32, extent: f32) -> Self {
        let mut weights = [0.0; WEIGHT_CHANNELS];
        weights[0] = 1.0;
        Self {
            x,
            y,
            pos: [
                (x as f32 - 127.5) / GRID_SIZE as f32 * extent,
                0.0,
                (y as f32 - 127.5) / GRID_SIZE as f32 * extent,
            ],
            normal: [0.0, 1.0, 0.0],
            tex_c: [x as f32 / 255.0 * 2.0, y as f32 / 255.0 * 2.0],
            weights,
        }
    }

    pub fn weight_sum(&self) -> f32 {
        self.weights.iter().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridState {
    Idle,
    Dirty,
}

/// 256×256 paintable heightfield. Weight edits mark the grid dirty for as
/// many frames as there are frame resources, so every set's vertex buffer
/// picks up the change.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    vertices: Vec<VertexForMap>,
    indices: Vec<u16>,
    extent: f32,
    frame_resource_count: usize,
    dirty_frames: usize,
}

impl TerrainGrid {
    pub fn new(extent: f32, frame_resource_count: usize) -> Self {
        let mut vertices = Vec::with_capacity(GRID_VERTEX_COUNT);
        for x in 0..GRID_SIZE {
            for y in 0..GRID_SIZE {
                vertices.push(VertexForMap::new(x, y, extent));
            }
        }

        let mut indices = Vec::with_capacity(GRID_INDEX_COUNT);
        for i in 0..GRID_SIZE - 1 {
            for j in 0..GRID_SIZE - 1 {
                let base = (i * GRID_SIZE + j) as u16;
                let size = GRID_SIZE as u16;
                indices.extend_from_slice(&[
                    base,
                    base + 1,
                    base + size,
                    base + 1,
                    base + size + 1,
                    base + size,
                ]);
            }
        }

        Self {
            vertices,
            indices,
            extent,
            frame_resource_count,
            dirty_frames: frame_resource_count,
        }
    }

    pub const fn index_of(x: u32, y: u32) -> usize {
        (x * GRID_SIZE + y) as usize
    }

    pub fn vertex(&self, x: u32, y: u32) -> Option<&VertexForMap> {
        if x >= GRID_SIZE || y >= GRID_SIZE {
            return None;
        }
        self.vertices.get(Self::index_of(x, y))
    }

    pub fn vertices(&self) -> &[VertexForMap] {
        &self.vertices
    }

    pub(crate) fn vertices_mut(&mut self) -> &mut [VertexForMap] {
        &mut self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn extent(&self) -> f32 {
        self.extent
    }

    /// World-space distance from the centre to the outermost vertex row.
    pub fn half_extent(&self) -> f32 {
        127.5 / GRID_SIZE as f32 * self.extent
    }

    pub fn state(&self) -> GridState {
        if self.dirty_frames > 0 {
            GridState::Dirty
        } else {
            GridState::Idle
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.state() == GridState::Dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty_frames = self.frame_resource_count;
    }

    /// Copies the whole grid into `buffer` if it is dirty. Returns whether
    /// an upload happened.
    pub fn upload_into(
        &mut self,
        buffer: &mut UploadBuffer<VertexForMap>,
    ) -> Result<bool, BufferOverflow> {
        if self.dirty_frames == 0 {
            return Ok(false);
        }
        buffer.copy_slice(0, &self.vertices)?;
        self.dirty_frames -= 1;
        Ok(true)
    }
}
