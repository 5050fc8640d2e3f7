//! Drawing surface abstraction.
//!
//! The engine only needs three primitives: filled rectangles (the trail fade
//! and the selection fill), filled circles (particles) and stroked, optionally
//! dashed rectangles (the selection outline). Anything that implements
//! [`Canvas`] can host the simulation: the GPU renderer in [`crate::gpu`], or
//! the [`Recorder`] used for headless runs and tests.
//!
//! Coordinates are screen pixels with the origin at the top-left corner.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Straight (non-premultiplied) RGBA colour, each channel in `0.0..=1.0`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels plus a float alpha, like CSS `rgba()`.
    pub fn rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    /// Build from hue in degrees, saturation and lightness in `0..=1`.
    pub fn hsla(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Self {
        let [r, g, b] = hsl_to_rgb(hue, saturation, lightness);
        Self { r, g, b, a: alpha }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// HSL to RGB. Hue in degrees (wrapped), saturation and lightness in `0..=1`.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
    let m = lightness - c / 2.0;

    let (r, g, b) = if h < 1.0 {
        (c, x, 0.0)
    } else if h < 2.0 {
        (x, c, 0.0)
    } else if h < 3.0 {
        (0.0, c, x)
    } else if h < 4.0 {
        (0.0, x, c)
    } else if h < 5.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    [r + m, g + m, b + m]
}

/// Axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Normalised rectangle spanned by two corners in any order.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self { min, size: max - min }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    pub fn translate(self, by: Vec2) -> Self {
        Self {
            min: self.min + by,
            ..self
        }
    }
}

/// Outline style for [`Canvas::stroke_rect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    /// `(on, off)` lengths in pixels, or `None` for a solid line.
    pub dash: Option<(f32, f32)>,
}

/// Which layer subsequent draw calls go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layer {
    /// Persistent layer that accumulates particle trails between frames.
    #[default]
    Trails,
    /// Redrawn from scratch every frame on top of the trails.
    Overlay,
}

/// A 2D drawing surface.
pub trait Canvas {
    /// Route subsequent draw calls. Surfaces without layers ignore this.
    fn set_layer(&mut self, _layer: Layer) {}

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke);
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect { layer: Layer, rect: Rect, color: Color },
    FillCircle { layer: Layer, center: Vec2, radius: f32, color: Color },
    StrokeRect { layer: Layer, rect: Rect, stroke: Stroke },
}

/// Canvas that records draw calls instead of rasterising them.
///
/// Useful for headless runs and for asserting on what a frame drew.
#[derive(Debug, Default)]
pub struct Recorder {
    layer: Layer,
    commands: Vec<DrawCommand>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.layer = Layer::Trails;
    }

    /// Number of circles drawn so far.
    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillCircle { .. }))
            .count()
    }

    /// All commands drawn on `layer`.
    pub fn on_layer(&self, layer: Layer) -> impl Iterator<Item = &DrawCommand> + '_ {
        self.commands.iter().filter(move |c| match c {
            DrawCommand::FillRect { layer: l, .. }
            | DrawCommand::FillCircle { layer: l, .. }
            | DrawCommand::StrokeRect { layer: l, .. } => *l == layer,
        })
    }
}

impl Canvas for Recorder {
    fn set_layer(&mut self, layer: Layer) {
        self.layer = layer;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            layer: self.layer,
            rect,
            color,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            layer: self.layer,
            center,
            radius,
            color,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.commands.push(DrawCommand::StrokeRect {
            layer: self.layer,
            rect,
            stroke,
        });
    }
}
