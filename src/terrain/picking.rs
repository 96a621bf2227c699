use crate::ui::{Rect, ViewportSize};
use glam::{Mat4, Vec2, Vec4};

/// Window-pixel rectangle covered by the map, found by projecting its two
/// opposite corners. `None` when a corner is behind the camera or the map
/// collapses to a line.
pub fn map_screen_rect(view_proj: Mat4, half_extent: f32, viewport: ViewportSize) -> Option<Rect> {
    let start = project_to_window(view_proj, Vec4::new(-half_extent, 0.0, -half_extent, 1.0), viewport)?;
    let end = project_to_window(view_proj, Vec4::new(half_extent, 0.0, half_extent, 1.0), viewport)?;
    let min = start.min(end);
    let size = (end - start).abs();
    if size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }
    Some(Rect::new(min.x, min.y, size.x, size.y))
}

/// Normalised map coordinates under `pointer`, with v pointing up the
/// screen. Pointers outside the map give `None`.
pub fn pick_uv(
    view_proj: Mat4,
    half_extent: f32,
    viewport: ViewportSize,
    pointer: Vec2,
) -> Option<Vec2> {
    let rect = map_screen_rect(view_proj, half_extent, viewport)?;
    let inside = pointer.x >= rect.x
        && pointer.y >= rect.y
        && pointer.x <= rect.right()
        && pointer.y <= rect.bottom();
    if !inside {
        return None;
    }
    Some(Vec2::new(
        (pointer.x - rect.x) / rect.width,
        1.0 - (pointer.y - rect.y) / rect.height,
    ))
}

fn project_to_window(view_proj: Mat4, point: Vec4, viewport: ViewportSize) -> Option<Vec2> {
    let clip = view_proj * point;
    if clip.w <= f32::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.width,
        (1.0 - ndc.y) * 0.5 * viewport.height,
    ))
}

#[cfg(test)]
mod tests {
    use super::{map_screen_rect, pick_uv};
    use crate::ui::ViewportSize;
    use crate::view::TopDownCamera;
    use glam::Vec2;

    #[test]
    fn screen_centre_picks_map_centre() {
        let viewport = ViewportSize::new(800.0, 600.0);
        let camera = TopDownCamera::new(50.0, (5.0, 150.0), 20.0);
        let view_proj = camera.view_proj(viewport.aspect_ratio());
        let half = 127.5 / 256.0 * 40.0;

        let uv = pick_uv(view_proj, half, viewport, Vec2::new(400.0, 300.0)).unwrap();
        assert!((uv - Vec2::splat(0.5)).length() < 1e-3, "{uv:?}");

        let rect = map_screen_rect(view_proj, half, viewport).unwrap();
        let top_left = pick_uv(view_proj, half, viewport, Vec2::new(rect.x, rect.y)).unwrap();
        assert!((top_left - Vec2::new(0.0, 1.0)).length() < 1e-4, "{top_left:?}");
        assert!(pick_uv(view_proj, half, viewport, Vec2::new(rect.x - 1.0, 300.0)).is_none());
    }
}
