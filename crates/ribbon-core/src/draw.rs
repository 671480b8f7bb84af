//! Paint types shared between the renderer and the drawing surface.
//!
//! Colors are straight (non-premultiplied) RGBA in the 0.0-1.0 range.

use crate::canvas::Point;

/// Number of strokes used to approximate a blurred shadow
pub const GLOW_PASSES: usize = 6;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels plus a 0-1 alpha, as in a CSS `rgba()` string
    pub fn rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    /// Build an opaque color from a `0xRRGGBB` literal
    pub fn hex(rgb: u32) -> Self {
        Self::rgba8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 1.0)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Color,
}

/// Linear gradient between two canvas points.
///
/// Points are projected onto the start-end axis; anything before the start
/// takes the first stop's color, anything past the end takes the last.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    stops: Vec<ColorStop>,
}

impl LinearGradient {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            stops: Vec::new(),
        }
    }

    /// Add a stop, keeping stops ordered by offset. Offsets are clamped to 0-1.
    pub fn add_color_stop(&mut self, offset: f32, color: Color) {
        let offset = offset.clamp(0.0, 1.0);
        let idx = self.stops.partition_point(|s| s.offset <= offset);
        self.stops.insert(idx, ColorStop { offset, color });
    }

    pub fn with_stop(mut self, offset: f32, color: Color) -> Self {
        self.add_color_stop(offset, color);
        self
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Color at position `t` along the gradient axis
    pub fn sample(&self, t: f32) -> Color {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            // A gradient without stops paints nothing
            _ => return Color::rgba(0.0, 0.0, 0.0, 0.0),
        };

        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }

        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if t <= hi.offset {
                let span = hi.offset - lo.offset;
                if t == hi.offset || span <= f32::EPSILON {
                    return hi.color;
                }
                return lo.color.lerp(hi.color, (t - lo.offset) / span);
            }
        }

        last.color
    }

    /// Color of the gradient at a canvas point
    pub fn color_at(&self, point: Point) -> Color {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq <= f64::EPSILON {
            return self.sample(0.0);
        }
        let t = ((point.x - self.start.x) * dx + (point.y - self.start.y) * dy) / len_sq;
        self.sample(t as f32)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Color),
    Linear(LinearGradient),
}

impl Paint {
    /// Resolve the paint to a concrete color at a point
    pub fn color_at(&self, point: Point) -> Color {
        match self {
            Paint::Solid(color) => *color,
            Paint::Linear(gradient) => gradient.color_at(point),
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

/// Soft glow drawn beneath a stroke
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Shadow {
    /// Blur radius in canvas units
    pub blur: f32,
    pub color: Color,
}

impl Shadow {
    pub fn new(blur: f32, color: Color) -> Self {
        Self { blur, color }
    }

    /// Widths and colors of the strokes approximating this glow around a
    /// stroke of `stroke_width`, widest (faintest) first.
    pub fn halo(&self, stroke_width: f32) -> Vec<(f32, Color)> {
        let n = GLOW_PASSES as f32;
        (1..=GLOW_PASSES)
            .rev()
            .map(|k| {
                let t = k as f32 / n;
                let width = stroke_width + self.blur * t;
                let alpha = self.color.a * (1.0 - t) * (2.0 / n);
                (width, self.color.with_alpha(alpha))
            })
            .filter(|(_, color)| color.a > 0.0)
            .collect()
    }
}
