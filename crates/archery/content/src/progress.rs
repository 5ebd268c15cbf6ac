//! Load progress reporting.
//!
//! Loaders report each file they finish to a sink owned by the caller. There
//! is no shared progress state: a caller that does not care passes
//! [`NoProgress`].

use std::sync::mpsc;

/// One step of a multi-file load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    /// Items finished so far, including `current`.
    pub loaded: usize,
    pub total: usize,
    /// Name of the item just finished.
    pub current: String,
}

impl LoadProgress {
    pub fn is_finished(&self) -> bool {
        self.loaded >= self.total
    }
}

/// Receives progress events from a loader.
pub trait ProgressSink {
    fn report(&mut self, progress: LoadProgress);
}

impl<F> ProgressSink for F
where
    F: FnMut(LoadProgress),
{
    fn report(&mut self, progress: LoadProgress) {
        self(progress)
    }
}

impl ProgressSink for mpsc::Sender<LoadProgress> {
    fn report(&mut self, progress: LoadProgress) {
        // A dropped receiver only means nobody is watching.
        let _ = self.send(progress);
    }
}

/// Discards progress events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _progress: LoadProgress) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(loaded: usize) -> LoadProgress {
        LoadProgress {
            loaded,
            total: 2,
            current: format!("item-{loaded}"),
        }
    }

    #[test]
    fn closures_collect_events() {
        let mut seen = Vec::new();
        {
            let mut sink = |progress: LoadProgress| seen.push(progress.loaded);
            sink.report(step(1));
            sink.report(step(2));
        }
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn channel_sink_forwards_and_tolerates_closed_receiver() {
        let (mut tx, rx) = mpsc::channel();
        tx.report(step(1));
        assert_eq!(rx.recv().unwrap(), step(1));
        drop(rx);
        tx.report(step(2));
        assert!(step(2).is_finished());
    }
}
