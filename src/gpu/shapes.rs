//! Instanced 2D primitives.
//!
//! Every draw call becomes one [`ShapeInstance`]: a screen-space box plus a
//! colour and a kind. A single pipeline expands each instance into a quad
//! and the fragment shader decides coverage (filled box, anti-aliased disc,
//! or a solid or dashed outline).

use crate::canvas::{Canvas, Color, Layer, Rect, Stroke};
use bytemuck::{Pod, Zeroable};
use glam::Vec2;

pub(crate) const KIND_RECT: f32 = 0.0;
pub(crate) const KIND_CIRCLE: f32 = 1.0;
pub(crate) const KIND_STROKE: f32 = 2.0;

/// Per-instance vertex data.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShapeInstance {
    /// Top-left corner in pixels.
    pub min: [f32; 2],
    pub size: [f32; 2],
    pub color: [f32; 4],
    /// `(kind, stroke width, dash on, dash off)`.
    pub params: [f32; 4],
}

impl ShapeInstance {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
        2 => Float32x4,
        3 => Float32x4
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ShapeInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }

    fn rect(rect: Rect, color: Color) -> Self {
        Self {
            min: rect.min.to_array(),
            size: rect.size.to_array(),
            color: color.to_array(),
            params: [KIND_RECT, 0.0, 0.0, 0.0],
        }
    }

    fn circle(center: Vec2, radius: f32, color: Color) -> Self {
        Self {
            min: (center - Vec2::splat(radius)).to_array(),
            size: [radius * 2.0; 2],
            color: color.to_array(),
            params: [KIND_CIRCLE, 0.0, 0.0, 0.0],
        }
    }

    fn stroke(rect: Rect, stroke: Stroke) -> Self {
        let (on, off) = stroke.dash.unwrap_or((0.0, 0.0));
        Self {
            min: rect.min.to_array(),
            size: rect.size.to_array(),
            color: stroke.color.to_array(),
            params: [KIND_STROKE, stroke.width, on, off],
        }
    }
}

/// One frame's worth of shapes, split by layer.
///
/// Implements [`Canvas`]; the renderer uploads and draws it afterwards.
#[derive(Debug, Default)]
pub struct ShapeBatch {
    layer: Layer,
    trails: Vec<ShapeInstance>,
    overlay: Vec<ShapeInstance>,
}

impl ShapeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty both layers, keeping their allocations.
    pub fn clear(&mut self) {
        self.layer = Layer::Trails;
        self.trails.clear();
        self.overlay.clear();
    }

    pub fn trails(&self) -> &[ShapeInstance] {
        &self.trails
    }

    pub fn overlay(&self) -> &[ShapeInstance] {
        &self.overlay
    }

    fn push(&mut self, shape: ShapeInstance) {
        match self.layer {
            Layer::Trails => self.trails.push(shape),
            Layer::Overlay => self.overlay.push(shape),
        }
    }
}

impl Canvas for ShapeBatch {
    fn set_layer(&mut self, layer: Layer) {
        self.layer = layer;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push(ShapeInstance::rect(rect, color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.push(ShapeInstance::circle(center, radius, color));
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.push(ShapeInstance::stroke(rect, stroke));
    }
}

/// Uniforms shared by every shape draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ShapeGlobals {
    /// Target size in pixels.
    pub screen: [f32; 2],
    pub _padding: [f32; 2],
}

pub const SHAPE_SHADER: &str = r#"
struct Globals {
    screen: vec2<f32>,
    _padding: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct ShapeIn {
    @location(0) min: vec2<f32>,
    @location(1) size: vec2<f32>,
    @location(2) color: vec4<f32>,
    @location(3) params: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) local_pos: vec2<f32>,
    @location(1) size: vec2<f32>,
    @location(2) color: vec4<f32>,
    @location(3) params: vec4<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32, shape: ShapeIn) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(0.0, 0.0),
        vec2<f32>(1.0, 0.0),
        vec2<f32>(0.0, 1.0),
        vec2<f32>(0.0, 1.0),
        vec2<f32>(1.0, 0.0),
        vec2<f32>(1.0, 1.0),
    );
    let corner = corners[vertex_index];

    // grow the quad so anti-aliased edges and outlines are not clipped
    let kind = u32(shape.params.x + 0.5);
    var pad = 0.0;
    if kind == 1u {
        pad = 1.0;
    } else if kind == 2u {
        pad = shape.params.y * 0.5 + 1.0;
    }

    let local_pos = corner * (shape.size + vec2<f32>(2.0 * pad)) - vec2<f32>(pad);
    let pixel = shape.min + local_pos;
    let ndc = vec2<f32>(
        pixel.x / globals.screen.x * 2.0 - 1.0,
        1.0 - pixel.y / globals.screen.y * 2.0,
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(ndc, 0.0, 1.0);
    out.local_pos = local_pos;
    out.size = shape.size;
    out.color = shape.color;
    out.params = shape.params;
    return out;
}

fn box_distance(p: vec2<f32>, size: vec2<f32>) -> f32 {
    let half_size = size * 0.5;
    let q = abs(p - half_size) - half_size;
    return length(max(q, vec2<f32>(0.0))) + min(max(q.x, q.y), 0.0);
}

// Distance travelled clockwise from the top-left corner to the closest
// point on the outline.
fn perimeter_position(p: vec2<f32>, size: vec2<f32>) -> f32 {
    let top = abs(p.y);
    let right = abs(p.x - size.x);
    let bottom = abs(p.y - size.y);
    let left = abs(p.x);
    let nearest = min(min(top, right), min(bottom, left));
    if nearest == top {
        return clamp(p.x, 0.0, size.x);
    }
    if nearest == right {
        return size.x + clamp(p.y, 0.0, size.y);
    }
    if nearest == bottom {
        return size.x + size.y + (size.x - clamp(p.x, 0.0, size.x));
    }
    return 2.0 * size.x + size.y + (size.y - clamp(p.y, 0.0, size.y));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let kind = u32(in.params.x + 0.5);
    var coverage = 1.0;

    if kind == 1u {
        let radius = in.size.x * 0.5;
        let d = length(in.local_pos - vec2<f32>(radius));
        coverage = clamp(radius - d + 0.5, 0.0, 1.0);
    } else if kind == 2u {
        let half_width = in.params.y * 0.5;
        let d = abs(box_distance(in.local_pos, in.size));
        coverage = clamp(half_width - d + 0.5, 0.0, 1.0);

        let period = in.params.z + in.params.w;
        if in.params.z > 0.0 && period > 0.0 {
            let t = perimeter_position(in.local_pos, in.size);
            if t - floor(t / period) * period >= in.params.z {
                coverage = 0.0;
            }
        }
    }

    if coverage <= 0.0 {
        discard;
    }
    return vec4<f32>(in.color.rgb, in.color.a * coverage);
}
"#;

/// Copies the persistent trail texture onto the surface.
pub const BLIT_SHADER: &str = r#"
@group(0) @binding(0)
var trail_texture: texture_2d<f32>;
@group(0) @binding(1)
var trail_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    // one triangle covering the screen
    let uv = vec2<f32>(f32((vertex_index << 1u) & 2u), f32(vertex_index & 2u));
    var out: VertexOutput;
    out.clip_position = vec4<f32>(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(trail_texture, trail_sampler, in.uv);
    return vec4<f32>(color.rgb, 1.0);
}
"#;
