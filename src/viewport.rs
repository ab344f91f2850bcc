//! Viewport tracking and the resize handler.

use crate::{context::SceneContext, render::Renderer};

/// Cap for the device pixel ratio handed to the renderer.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Logical size of the drawing surface plus the host's pixel density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Zero sizes are raised to 1 so the aspect ratio is always defined.
    pub fn new(width: u32, height: u32, device_pixel_ratio: f64) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            device_pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    /// Height in device pixels, the unit winit reports cursor positions in.
    pub fn physical_height(&self) -> f32 {
        let ratio = if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        };
        (self.height as f64 * ratio).round().max(1.0) as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 600, 1.0)
    }
}

/// `device_pixel_ratio` limited to `max`. Nonsense ratios fall back to 1.
pub fn clamp_pixel_ratio(device_pixel_ratio: f64, max: f64) -> f64 {
    if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(max)
    } else {
        1.0
    }
}

/// React to a new viewport: update the camera projection and resize the
/// renderer output. Animation state is left alone, and calling this twice
/// with the same viewport leaves everything as after the first call.
pub fn handle_resize(
    ctx: &mut SceneContext,
    renderer: &mut dyn Renderer,
    viewport: Viewport,
    max_pixel_ratio: f64,
) -> anyhow::Result<()> {
    let viewport = Viewport::new(viewport.width, viewport.height, viewport.device_pixel_ratio);
    ctx.viewport = viewport;

    let (_, camera) = ctx.scene.camera_mut(ctx.camera)?;
    camera.aspect = viewport.aspect();
    camera.update_projection_matrix();

    renderer.set_size(viewport.width, viewport.height);
    renderer.set_pixel_ratio(clamp_pixel_ratio(viewport.device_pixel_ratio, max_pixel_ratio));
    log::debug!(
        "resized to {}x{} @ {}",
        viewport.width,
        viewport.height,
        renderer.pixel_ratio()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped() {
        assert_eq!(clamp_pixel_ratio(3.0, MAX_PIXEL_RATIO), 2.0);
        assert_eq!(clamp_pixel_ratio(1.5, MAX_PIXEL_RATIO), 1.5);
        assert_eq!(clamp_pixel_ratio(f64::NAN, MAX_PIXEL_RATIO), 1.0);
        assert_eq!(clamp_pixel_ratio(0.0, MAX_PIXEL_RATIO), 1.0);
    }

    #[test]
    fn physical_height_follows_the_device_pixel_ratio() {
        assert_eq!(Viewport::new(800, 600, 2.0).physical_height(), 1200.0);
        assert_eq!(Viewport::new(800, 600, 1.5).physical_height(), 900.0);
        assert_eq!(Viewport::new(800, 600, f64::NAN).physical_height(), 600.0);
    }

    #[test]
    fn zero_sized_viewport_has_an_aspect() {
        let viewport = Viewport::new(0, 0, 1.0);
        assert_eq!((viewport.width, viewport.height), (1, 1));
        assert_eq!(viewport.aspect(), 1.0);
    }
}
