//! Drawing surface abstraction and a command-recording implementation.
//!
//! The renderer talks to a canvas-style [`Surface`]. [`CommandRecorder`]
//! resolves path and paint state into a flat [`DrawCommand`] queue that a
//! backend replays later (the window's view callback, or a test).

use crate::canvas::{Point, Rect};
use crate::draw::{Paint, Shadow};

pub trait Surface {
    /// Erase a region back to the background
    fn clear(&mut self, rect: Rect);

    /// Discard the current path
    fn begin_path(&mut self);

    /// Start a new sub-path at `point`
    fn move_to(&mut self, point: Point);

    fn line_to(&mut self, point: Point);

    /// Join the current sub-path back to its first point
    fn close_path(&mut self);

    /// Stroke the current path with the current paint state
    fn stroke(&mut self, paint: &Paint, width: f32);

    fn set_shadow(&mut self, shadow: Option<Shadow>);

    /// Push the current paint state
    fn save(&mut self);

    /// Pop the last saved paint state. Does nothing if none was saved.
    fn restore(&mut self);
}

/// Run `f` between `save` and `restore`, so paint state set inside never
/// outlives the call.
pub fn with_saved<S, R>(surface: &mut S, f: impl FnOnce(&mut S) -> R) -> R
where
    S: Surface + ?Sized,
{
    surface.save();
    let out = f(surface);
    surface.restore();
    out
}

/// A fully resolved drawing operation
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear {
        rect: Rect,
    },
    Stroke {
        points: Vec<Point>,
        closed: bool,
        paint: Paint,
        width: f32,
        shadow: Option<Shadow>,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
struct PaintState {
    shadow: Option<Shadow>,
}

#[derive(Clone, Debug, Default)]
struct SubPath {
    points: Vec<Point>,
    closed: bool,
}

/// [`Surface`] that queues [`DrawCommand`]s instead of rasterizing
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
    subpaths: Vec<SubPath>,
    state: PaintState,
    saved: Vec<PaintState>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Hand over the queued commands, leaving the queue empty.
    /// Paint state and the current path are kept, as on a real canvas.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Depth of the save stack
    pub fn saved_depth(&self) -> usize {
        self.saved.len()
    }
}

impl Surface for CommandRecorder {
    fn clear(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Clear { rect });
    }

    fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    fn move_to(&mut self, point: Point) {
        self.subpaths.push(SubPath {
            points: vec![point],
            closed: false,
        });
    }

    fn line_to(&mut self, point: Point) {
        if let Some(sub) = self.subpaths.last_mut().filter(|s| !s.closed) {
            sub.points.push(point);
            return;
        }
        // lineTo without a live sub-path behaves like moveTo
        self.move_to(point);
    }

    fn close_path(&mut self) {
        if let Some(sub) = self.subpaths.last_mut() {
            sub.closed = true;
        }
    }

    fn stroke(&mut self, paint: &Paint, width: f32) {
        for sub in self.subpaths.iter().filter(|s| s.points.len() > 1) {
            self.commands.push(DrawCommand::Stroke {
                points: sub.points.clone(),
                closed: sub.closed,
                paint: paint.clone(),
                width,
                shadow: self.state.shadow,
            });
        }
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.state.shadow = shadow;
    }

    fn save(&mut self) {
        self.saved.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }
}
