//! Recognition progress reporting.

/// Forwards recognition progress to a caller-supplied callback.
///
/// Values are clamped to `0..=100` and never go backwards within one run:
/// a report lower than the last emitted value is dropped, as is a repeat.
pub struct ProgressTracker<'a> {
    sink: Box<dyn FnMut(u8) + 'a>,
    last: Option<u8>,
}

impl<'a> ProgressTracker<'a> {
    /// Create a tracker that forwards percentages to `sink`.
    pub fn new(sink: impl FnMut(u8) + 'a) -> Self {
        Self {
            sink: Box::new(sink),
            last: None,
        }
    }

    /// A tracker that discards every report.
    pub fn silent() -> Self {
        Self::new(|_| {})
    }

    /// Report a percentage.
    pub fn report(&mut self, percent: u8) {
        let percent = percent.min(100);
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        (self.sink)(percent);
    }

    /// Report progress as a fraction in `0.0..=1.0` (tesseract.js style).
    pub fn report_fraction(&mut self, fraction: f32) {
        if !fraction.is_finite() {
            return;
        }
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).round() as u8;
        self.report(percent);
    }

    /// Report completion.
    pub fn finish(&mut self) {
        self.report(100);
    }

    /// Last value forwarded to the callback.
    pub fn last(&self) -> Option<u8> {
        self.last
    }
}

impl Default for ProgressTracker<'_> {
    fn default() -> Self {
        Self::silent()
    }
}

impl std::fmt::Debug for ProgressTracker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}
