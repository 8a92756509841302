/// Receives progress of a buffering pass, one call per feature processed.
pub trait ProgressObserver {
    fn start(&self, _total: usize) {}
    fn feature(&self, position: usize, label: &str);
    fn finish(&self) {}
}

/// Ignores progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn feature(&self, _position: usize, _label: &str) {}
}

/// Reports each feature as a `tracing` debug event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn start(&self, total: usize) {
        tracing::debug!(total, "buffering collection");
    }

    fn feature(&self, position: usize, label: &str) {
        tracing::debug!(position, label, "buffering");
    }
}
