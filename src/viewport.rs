//! Mapping between world space and screen space.
//!
//! World space is the phase plane of the oscillator, y pointing up. Screen
//! space is canvas pixels, origin top-left, y pointing down. The world point
//! `(offset_x, offset_y)` sits at the canvas centre and one world unit spans
//! `effective_scale` pixels.

use crate::canvas::Rect;
use crate::config::FlowConfig;
use glam::Vec2;

/// Expansion applied to the visible world extent for spawn/kill boxes and
/// view fitting, so particles appear and vanish just outside the frame.
pub const MARGIN_FACTOR: f32 = 1.2;

/// Smallest world extent used when fitting a degenerate bounding box.
pub const MIN_WORLD_EXTENT: f32 = 1.0e-4;

/// Pixel size of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// The full canvas as a rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Resolve the transform for the current configuration.
    pub fn transform(&self, config: &FlowConfig) -> ViewTransform {
        ViewTransform {
            size: self.size(),
            center: Vec2::new(config.offset_x, config.offset_y),
            scale: config.effective_scale(),
        }
    }
}

/// A resolved world/screen mapping, valid for one configuration state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Canvas size in pixels.
    pub size: Vec2,
    /// World point at the canvas centre.
    pub center: Vec2,
    /// Effective pixels per world unit.
    pub scale: f32,
}

impl ViewTransform {
    #[inline]
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            self.size.x / 2.0 + (world.x - self.center.x) * self.scale,
            self.size.y / 2.0 - (world.y - self.center.y) * self.scale,
        )
    }

    #[inline]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            (screen.x - self.size.x / 2.0) / self.scale + self.center.x,
            (self.size.y / 2.0 - screen.y) / self.scale + self.center.y,
        )
    }

    /// World-space size of the visible canvas.
    #[inline]
    pub fn world_extent(&self) -> Vec2 {
        self.size / self.scale
    }

    /// Half-extents of the margined box particles must stay inside.
    #[inline]
    pub fn margined_half_extent(&self) -> Vec2 {
        self.world_extent() / 2.0 * MARGIN_FACTOR
    }

    /// Whether `world` lies inside the margined view box (edges included).
    pub fn contains_margined(&self, world: Vec2) -> bool {
        let half = self.margined_half_extent();
        let min = self.center - half;
        let max = self.center + half;
        world.x >= min.x && world.x <= max.x && world.y >= min.y && world.y <= max.y
    }
}

/// World-space axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Bounding box of a set of points, or `None` when there are none.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec2>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Width and height, each floored at [`MIN_WORLD_EXTENT`].
    #[inline]
    pub fn extent(&self) -> Vec2 {
        (self.max - self.min).max(Vec2::splat(MIN_WORLD_EXTENT))
    }
}

/// A scale and world centre to move the view to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTarget {
    pub scale: f32,
    pub center: Vec2,
}

/// View that frames `bounds` with the standard margin.
///
/// `None` bounds fall back to the default scale at the origin.
pub fn fit_bounds(bounds: Option<Bounds>, viewport: &Viewport, config: &FlowConfig) -> ViewTarget {
    let Some(bounds) = bounds else {
        return ViewTarget {
            scale: config.clamp_scale(config.default_scale),
            center: Vec2::ZERO,
        };
    };

    let extent = bounds.extent() * MARGIN_FACTOR;
    let scale = (viewport.width / extent.x).min(viewport.height / extent.y);
    ViewTarget {
        scale: config.clamp_scale(scale),
        center: bounds.center(),
    }
}

/// View that fills the canvas with the screen rectangle `selection`.
pub fn zoom_to_rect(selection: Rect, view: &ViewTransform, config: &FlowConfig) -> ViewTarget {
    let center = view.screen_to_world(selection.center());
    let scale_x = view.scale * (view.size.x / selection.width());
    let scale_y = view.scale * (view.size.y / selection.height());
    ViewTarget {
        scale: config.clamp_scale(scale_x.min(scale_y)),
        center,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(scale: f32, center: Vec2) -> ViewTransform {
        ViewTransform {
            size: Vec2::new(800.0, 600.0),
            center,
            scale,
        }
    }

    #[test]
    fn test_origin_maps_to_canvas_centre() {
        let v = view(100.0, Vec2::ZERO);
        assert_eq!(v.world_to_screen(Vec2::ZERO), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_y_axis_is_flipped() {
        let v = view(100.0, Vec2::ZERO);
        assert_eq!(v.world_to_screen(Vec2::new(1.0, 1.0)), Vec2::new(500.0, 200.0));
    }

    #[test]
    fn test_round_trip_both_ways() {
        let v = view(137.5, Vec2::new(-0.8, 2.25));
        for &(x, y) in &[(0.0, 0.0), (12.5, 599.0), (799.0, 1.0), (400.0, 300.0)] {
            let s = Vec2::new(x, y);
            let back = v.world_to_screen(v.screen_to_world(s));
            assert!((back - s).length() < 1e-3, "{s:?} -> {back:?}");
        }
        for &(x, y) in &[(0.0, 0.0), (-3.0, 1.5), (2.0, -2.0)] {
            let w = Vec2::new(x, y);
            let back = v.screen_to_world(v.world_to_screen(w));
            assert!((back - w).length() < 1e-5, "{w:?} -> {back:?}");
        }
    }

    #[test]
    fn test_margined_box() {
        let v = view(100.0, Vec2::new(1.0, 0.0));
        // visible half extent is (4, 3); margined (4.8, 3.6)
        assert!(v.contains_margined(Vec2::new(5.7, 3.5)));
        assert!(!v.contains_margined(Vec2::new(5.9, 0.0)));
        assert!(!v.contains_margined(Vec2::new(1.0, -3.7)));
    }

    #[test]
    fn test_bounds_from_points() {
        assert!(Bounds::from_points(Vec::<Vec2>::new()).is_none());

        let b = Bounds::from_points([Vec2::new(1.0, -1.0), Vec2::new(-2.0, 4.0), Vec2::new(0.5, 0.0)])
            .unwrap();
        assert_eq!(b.min, Vec2::new(-2.0, -1.0));
        assert_eq!(b.max, Vec2::new(1.0, 4.0));
        assert_eq!(b.center(), Vec2::new(-0.5, 1.5));
    }

    #[test]
    fn test_fit_without_points_uses_default() {
        let config = FlowConfig::default();
        let target = fit_bounds(None, &Viewport::new(800.0, 600.0), &config);
        assert_eq!(target.scale, config.default_scale);
        assert_eq!(target.center, Vec2::ZERO);
    }

    #[test]
    fn test_fit_single_point_is_clamped() {
        let config = FlowConfig::default();
        let b = Bounds::from_points([Vec2::new(0.5, 0.5)]);
        let target = fit_bounds(b, &Viewport::new(800.0, 600.0), &config);
        assert!(target.scale.is_finite());
        assert_eq!(target.scale, config.max_scale);
        assert_eq!(target.center, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_fit_uses_tighter_axis() {
        let config = FlowConfig::default();
        let b = Bounds::from_points([Vec2::new(-2.0, -1.0), Vec2::new(2.0, 1.0)]);
        let target = fit_bounds(b, &Viewport::new(800.0, 600.0), &config);
        // 800 / (4 * 1.2) = 166.67, 600 / (2 * 1.2) = 250
        assert!((target.scale - 800.0 / 4.8).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_to_rect() {
        let config = FlowConfig::default();
        let v = view(100.0, Vec2::ZERO);
        let sel = Rect::new(400.0, 300.0, 200.0, 100.0);
        let target = zoom_to_rect(sel, &v, &config);
        // min(100 * 800/200, 100 * 600/100) = 400
        assert_eq!(target.scale, 400.0);
        assert_eq!(target.center, v.screen_to_world(Vec2::new(500.0, 350.0)));
        assert_eq!(target.center, Vec2::new(1.0, -0.5));
    }
}
