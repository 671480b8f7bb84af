//! Replays recorded ribbon frames onto a nannou [`Draw`].
//!
//! The ribbon is laid out on a fixed canvas with a top-left origin and y
//! pointing down. nannou draws around the window centre with y up, so every
//! point goes through a [`CanvasTransform`] first.

use nannou::color::{rgba, Rgba};
use nannou::prelude::*;
use ribbon_core::{Canvas, Color, DrawCommand, Paint, Point, Shadow};

/// Maps canvas coordinates into a window rect, keeping aspect ratio
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CanvasTransform {
    scale: f32,
    half_w: f32,
    half_h: f32,
    center: Point2,
}

impl CanvasTransform {
    pub fn fit(canvas: &Canvas, bounds: Rect) -> Self {
        let (cw, ch) = (canvas.width as f32, canvas.height as f32);
        let scale = (bounds.w() / cw).min(bounds.h() / ch);
        Self {
            scale,
            half_w: cw * 0.5,
            half_h: ch * 0.5,
            center: bounds.xy(),
        }
    }

    pub fn point(&self, p: Point) -> Point2 {
        pt2(
            (p.x as f32 - self.half_w) * self.scale + self.center.x,
            (self.half_h - p.y as f32) * self.scale + self.center.y,
        )
    }

    pub fn length(&self, len: f32) -> f32 {
        len * self.scale
    }

    /// Shadow with its blur in window pixels
    pub fn shadow(&self, shadow: &Shadow) -> Shadow {
        Shadow::new(self.length(shadow.blur), shadow.color)
    }
}

fn to_rgba(c: Color) -> Rgba {
    rgba(c.r, c.g, c.b, c.a)
}

/// Endpoints closer than this already close the path
const CLOSE_EPSILON: f64 = 1e-9;

/// Stroke points in canvas space. Closed paths end on their first point,
/// which is appended only when the last point is not already there.
fn outline(points: &[Point], closed: bool) -> Vec<Point> {
    let mut out = points.to_vec();
    if let (true, Some(&first), Some(&last)) = (closed, points.first(), points.last()) {
        if points.len() > 1 && first.distance(last) > CLOSE_EPSILON {
            out.push(first);
        }
    }
    out
}

pub fn execute(cmd: &DrawCommand, draw: &Draw, transform: &CanvasTransform) {
    match cmd {
        DrawCommand::Clear { .. } => {
            draw.background().color(BLACK);
        }
        DrawCommand::Stroke {
            points,
            closed,
            paint,
            width,
            shadow,
        } => {
            let outline = outline(points, *closed);
            if outline.len() < 2 {
                return;
            }
            let mapped: Vec<Point2> = outline.iter().map(|&p| transform.point(p)).collect();

            if let Some(shadow) = shadow {
                let glow = transform.shadow(shadow);
                for (w, color) in glow.halo(transform.length(*width)) {
                    draw.polyline()
                        .weight(w)
                        .join_round()
                        .points(mapped.iter().copied())
                        .color(to_rgba(color));
                }
            }

            let weight = transform.length(*width);
            match paint {
                Paint::Solid(color) => {
                    draw.polyline()
                        .weight(weight)
                        .join_round()
                        .points(mapped)
                        .color(to_rgba(*color));
                }
                Paint::Linear(_) => {
                    let colored = outline
                        .iter()
                        .zip(mapped)
                        .map(|(&p, np)| (np, to_rgba(paint.color_at(p))));
                    draw.polyline()
                        .weight(weight)
                        .join_round()
                        .points_colored(colored);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_canvas_center_maps_to_window_center() {
        let t = CanvasTransform::fit(&Canvas::default(), Rect::from_w_h(440.0, 440.0));
        let p = t.point(Point::new(220.0, 220.0));
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 0.0);
    }

    #[test]
    fn test_top_left_corner_flips_y() {
        let t = CanvasTransform::fit(&Canvas::default(), Rect::from_w_h(440.0, 440.0));
        let p = t.point(Point::new(0.0, 0.0));
        assert_relative_eq!(p.x, -220.0);
        assert_relative_eq!(p.y, 220.0);
    }

    #[test]
    fn test_wide_window_letterboxes() {
        let t = CanvasTransform::fit(&Canvas::default(), Rect::from_w_h(880.0, 440.0));
        assert_relative_eq!(t.length(4.0), 4.0);
        let p = t.point(Point::new(440.0, 440.0));
        assert_relative_eq!(p.x, 220.0);
        assert_relative_eq!(p.y, -220.0);
    }

    #[test]
    fn test_large_window_scales_up() {
        let t = CanvasTransform::fit(&Canvas::default(), Rect::from_w_h(880.0, 880.0));
        assert_relative_eq!(t.length(2.0), 4.0);
        let p = t.point(Point::new(365.0, 220.0));
        assert_relative_eq!(p.x, 290.0);
    }

    #[test]
    fn test_outline_closes_path() {
        let pts = [Point::new(1.0, 1.0), Point::new(2.0, 2.0)];
        let closed = outline(&pts, true);
        assert_eq!(closed.len(), 3);
        assert_eq!(closed[2], pts[0]);
        assert_eq!(outline(&pts, false).len(), 2);
    }

    #[test]
    fn test_outline_keeps_self_closing_ribbon() {
        let ribbon = ribbon_core::RibbonGeometry::default().ribbon(3.7, 255.0, 28.0);
        let points = ribbon.points();
        assert_eq!(points.len(), 361);

        let closed = outline(points, true);
        assert_eq!(closed.len(), 361);
        assert_eq!(closed.last(), points.last());
    }
}
