use super::grid::{GRID_SIZE, TerrainGrid, WEIGHT_CHANNELS};
use glam::Vec2;

/// Material channel the brush paints into, always `0..8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BrushChannel(u8);

impl BrushChannel {
    pub fn new(channel: u8) -> Option<Self> {
        ((channel as usize) < WEIGHT_CHANNELS).then_some(Self(channel))
    }

    /// Keys `'1'..='8'` select channels 0..=7.
    pub fn from_hotkey(key: char) -> Option<Self> {
        let digit = key.to_digit(10)?;
        Self::new(u8::try_from(digit.checked_sub(1)?).ok()?)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Adds `1 - d/radius` to `channel` of every vertex within `radius` grid
/// units of `center_uv` (scaled to `0..=255`), then renormalises that
/// vertex's weights to sum to 1. Returns the number of vertices changed.
///
/// Only the bounding box of the circle is scanned. A vertex whose weights
/// would sum to zero (or a non-finite value) is left untouched.
pub fn apply_brush(
    grid: &mut TerrainGrid,
    center_uv: Vec2,
    radius: f32,
    channel: BrushChannel,
) -> usize {
    if radius <= 0.0 || !radius.is_finite() || !center_uv.is_finite() {
        return 0;
    }
    let max = (GRID_SIZE - 1) as f32;
    let center = center_uv * max;

    let lo = (center - Vec2::splat(radius)).floor().max(Vec2::ZERO);
    let hi = (center + Vec2::splat(radius)).ceil().min(Vec2::splat(max));
    if lo.x > hi.x || lo.y > hi.y {
        return 0;
    }

    let vertices = grid.vertices_mut();
    let mut touched = 0;
    for x in lo.x as u32..=hi.x as u32 {
        for y in lo.y as u32..=hi.y as u32 {
            let distance = Vec2::new(x as f32, y as f32).distance(center);
            if distance > radius {
                continue;
            }
            let vertex = &mut vertices[TerrainGrid::index_of(x, y)];
            let mut weights = vertex.weights;
            weights[channel.index()] += 1.0 - distance / radius;
            let sum: f32 = weights.iter().sum();
            if sum <= 0.0 || !sum.is_finite() {
                log::debug!("brush: skipping vertex ({x}, {y}) with weight sum {sum}");
                continue;
            }
            for weight in &mut weights {
                *weight /= sum;
            }
            vertex.weights = weights;
            touched += 1;
        }
    }

    if touched > 0 {
        grid.mark_dirty();
    }
    touched
}
