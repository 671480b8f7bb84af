//! Spectral sampling contract between the frame loop and an audio backend.

/// Source of per-bin frequency magnitudes, read once per frame.
pub trait SpectralSampler {
    /// Number of bins written by [`byte_frequency_data`](Self::byte_frequency_data)
    fn frequency_bin_count(&self) -> usize;

    /// Fill `out` with the current magnitude of each bin (0-255).
    ///
    /// Writes `min(out.len(), frequency_bin_count())` values. Backends that
    /// are not producing audio yet write zeros.
    fn byte_frequency_data(&mut self, out: &mut [u8]);
}

impl<S: SpectralSampler + ?Sized> SpectralSampler for Box<S> {
    fn frequency_bin_count(&self) -> usize {
        (**self).frequency_bin_count()
    }

    fn byte_frequency_data(&mut self, out: &mut [u8]) {
        (**self).byte_frequency_data(out)
    }
}

/// Sampler with no audio behind it: every bin reads 0
#[derive(Clone, Debug)]
pub struct SilentSampler {
    bins: usize,
}

impl SilentSampler {
    pub fn new(bins: usize) -> Self {
        Self { bins }
    }
}

impl SpectralSampler for SilentSampler {
    fn frequency_bin_count(&self) -> usize {
        self.bins
    }

    fn byte_frequency_data(&mut self, out: &mut [u8]) {
        out.iter_mut().for_each(|b| *b = 0);
    }
}
