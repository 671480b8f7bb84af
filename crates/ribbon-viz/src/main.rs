mod audio;
mod cli;
mod error;
mod renderer;
mod utils;

use audio::{AnalyserSettings, LiveSampler, SourcePipe};
use clap::Parser;
use cli::Args;
use log::{error, info, warn};
use nannou::prelude::*;
use renderer::CanvasTransform;
use ribbon_core::{CommandRecorder, DrawCommand, FrameScheduler, SilentSampler, SpectralSampler};
use std::sync::OnceLock;
use utils::Config;

/// Startup state handed to `model`, which cannot capture
#[derive(Clone, Default)]
struct Startup {
    args: Args,
    config: Config,
    settings: AnalyserSettings,
}

static STARTUP: OnceLock<Startup> = OnceLock::new();

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.list_devices {
        SourcePipe::list_devices();
        return;
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => fail(e),
    };
    let settings = match config.analyser_settings() {
        Ok(settings) => settings,
        Err(e) => fail(e),
    };

    set_once(
        &STARTUP,
        Startup {
            args,
            config,
            settings,
        },
    );

    nannou::app(model).update(update).exit(exit).run();
}

/// Store `value` unless the cell is already filled. Returns whether it was stored.
fn set_once<T>(cell: &OnceLock<T>, value: T) -> bool {
    let stored = cell.set(value).is_ok();
    if !stored {
        warn!("Startup settings were already set, keeping the first");
    }
    stored
}

fn fail(e: error::Error) -> ! {
    error!("{}", e);
    let mut source = std::error::Error::source(&e);
    while let Some(cause) = source {
        error!("  caused by: {}", cause);
        source = cause.source();
    }
    std::process::exit(1);
}

struct Model {
    scheduler: FrameScheduler<Box<dyn SpectralSampler>>,
    recorder: CommandRecorder,
    /// Commands of the most recent frame, replayed by `view`
    frame: Vec<DrawCommand>,
}

fn model(app: &App) -> Model {
    let Startup {
        args,
        mut config,
        settings,
    } = STARTUP.get().cloned().unwrap_or_default();

    app.new_window()
        .title("ribbon-viz")
        .size(440, 440)
        .resizable(false)
        .view(view)
        .build()
        .expect("failed to create window");

    let sampler = open_sampler(args.device, &mut config, settings);

    Model {
        scheduler: FrameScheduler::new(sampler),
        recorder: CommandRecorder::new(),
        frame: Vec::new(),
    }
}

/// Live capture when a device opens, otherwise idle animation
fn open_sampler(
    requested: Option<usize>,
    config: &mut Config,
    settings: AnalyserSettings,
) -> Box<dyn SpectralSampler> {
    let mut pipe = match SourcePipe::open(requested, config, settings.fft_size) {
        Ok(pipe) => pipe,
        Err(e) => {
            warn!("Audio input unavailable ({}), animating without sound", e);
            return Box::new(SilentSampler::new(settings.frequency_bin_count()));
        }
    };

    if requested.is_some() {
        let device = pipe.device();
        config.set_device(&device.name, device.is_input);
        if let Err(e) = config.save() {
            warn!("Could not remember device: {}", e);
        }
    }

    match pipe.resume() {
        Ok(()) => info!(
            "Analysing {} bins at {} Hz",
            settings.frequency_bin_count(),
            pipe.sample_rate()
        ),
        Err(e) => warn!("Audio capture did not start ({}), input stays silent", e),
    }

    Box::new(LiveSampler::new(pipe, settings))
}

fn update(_app: &App, model: &mut Model, _update: Update) {
    model.scheduler.tick(&mut model.recorder);
    model.frame = model.recorder.take_commands();
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let transform = CanvasTransform::fit(&model.scheduler.style().canvas, app.window_rect());

    for cmd in &model.frame {
        renderer::execute(cmd, &draw, &transform);
    }

    if let Err(e) = draw.to_frame(app, &frame) {
        error!("Failed to render frame: {:?}", e);
    }
}

fn exit(_app: &App, model: Model) {
    let state = model.scheduler.state();
    info!(
        "Stopped after {} frames (t = {:.3}, energy = {:.2})",
        model.scheduler.frames(),
        state.time(),
        state.energy
    );
}
