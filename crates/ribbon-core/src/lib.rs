//! Audio-reactive ribbon animation.
//!
//! Per frame: a [`SpectralSampler`] snapshot is folded into the smoothed
//! energy, the phase clock ticks, and concentric ribbons are drawn onto a
//! [`Surface`]. Everything here is windowing- and device-agnostic.

pub mod audio;
pub mod canvas;
pub mod curve;
pub mod draw;
pub mod energy;
pub mod layers;
pub mod scheduler;
pub mod state;
pub mod surface;

pub use audio::{SilentSampler, SpectralSampler};
pub use canvas::{Canvas, Point, Rect};
pub use curve::{RibbonCurve, RibbonGeometry, BASE_RADIUS, POINTS};
pub use draw::{Color, ColorStop, LinearGradient, Paint, Shadow};
pub use layers::{ambient_layers, render_frame, LayerSpec, RibbonStyle, LAYERS, LAYER_GAP};
pub use scheduler::{FrameLimit, FrameScheduler, FrameTiming};
pub use state::{AnimationState, PhaseClock, TIME_STEP};
pub use surface::{with_saved, CommandRecorder, DrawCommand, Surface};
