//! Layered ribbon rendering: faint ambient bands plus a glowing core.

use crate::canvas::Canvas;
use crate::curve::{RibbonCurve, RibbonGeometry};
use crate::draw::{Color, LinearGradient, Paint, Shadow};
use crate::state::AnimationState;
use crate::surface::{with_saved, Surface};

/// Number of ambient bands
pub const LAYERS: usize = 8;
/// Radial spacing between ambient bands
pub const LAYER_GAP: f64 = 4.0;

const AMBIENT_WIDTH: f32 = 2.0;
const AMBIENT_BASE_ALPHA: f32 = 0.05;
const AMBIENT_ALPHA_STEP: f32 = 0.02;

const CORE_WIDTH: f32 = 4.0;
const CORE_GLOW_BLUR: f32 = 35.0;

/// Placement and opacity of one ambient band
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayerSpec {
    pub radius_offset: f64,
    pub opacity: f32,
}

impl LayerSpec {
    pub fn nth(i: usize) -> Self {
        Self {
            radius_offset: i as f64 * LAYER_GAP,
            opacity: AMBIENT_BASE_ALPHA + i as f32 * AMBIENT_ALPHA_STEP,
        }
    }
}

/// Ambient bands in draw order (innermost and faintest first)
pub fn ambient_layers() -> [LayerSpec; LAYERS] {
    std::array::from_fn(LayerSpec::nth)
}

/// Everything about a frame that does not change between frames
#[derive(Clone, Debug)]
pub struct RibbonStyle {
    pub canvas: Canvas,
    pub geometry: RibbonGeometry,
    pub layers: [LayerSpec; LAYERS],
    pub ambient_color: Color,
    pub ambient_width: f32,
    pub core_width: f32,
    pub core_glow: Shadow,
    pub core_gradient: LinearGradient,
}

impl Default for RibbonStyle {
    fn default() -> Self {
        Self::for_canvas(Canvas::default())
    }
}

impl RibbonStyle {
    pub fn for_canvas(canvas: Canvas) -> Self {
        let (start, end) = canvas.diagonal();
        let core_gradient = LinearGradient::new(start, end)
            .with_stop(0.0, Color::hex(0x3cf2ff))
            .with_stop(0.5, Color::hex(0x6f6bff))
            .with_stop(1.0, Color::hex(0xd96bff));

        Self {
            canvas,
            geometry: RibbonGeometry::with_center(canvas.center()),
            layers: ambient_layers(),
            ambient_color: Color::rgba8(120, 180, 255, 1.0),
            ambient_width: AMBIENT_WIDTH,
            core_width: CORE_WIDTH,
            core_glow: Shadow::new(CORE_GLOW_BLUR, Color::rgba8(140, 180, 255, 0.7)),
            core_gradient,
        }
    }
}

/// Trace `curve` as a single closed sub-path
fn trace<S: Surface + ?Sized>(surface: &mut S, curve: &RibbonCurve) {
    surface.begin_path();
    let mut points = curve.points().iter().copied();
    if let Some(first) = points.next() {
        surface.move_to(first);
    }
    for p in points {
        surface.line_to(p);
    }
    surface.close_path();
}

/// Draw one full frame for `state`
pub fn render_frame<S>(surface: &mut S, state: &AnimationState, style: &RibbonStyle)
where
    S: Surface + ?Sized,
{
    let time = state.time();
    let energy = state.energy;

    surface.clear(style.canvas.bounds());

    for layer in &style.layers {
        let curve = style.geometry.ribbon(time, energy, layer.radius_offset);
        trace(surface, &curve);
        let paint = Paint::Solid(style.ambient_color.with_alpha(layer.opacity));
        surface.stroke(&paint, style.ambient_width);
    }

    let core = style.geometry.ribbon(time, energy, 0.0);
    with_saved(surface, |s| {
        s.set_shadow(Some(style.core_glow));
        trace(s, &core);
        s.stroke(&Paint::Linear(style.core_gradient.clone()), style.core_width);
    });
}
