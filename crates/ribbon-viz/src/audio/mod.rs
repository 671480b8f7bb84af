mod analyser;
mod source_pipe;

pub use analyser::{AnalyserSettings, LiveSampler};
pub use source_pipe::SourcePipe;
