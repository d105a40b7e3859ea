//! Records outputs (sent messages, stored blocks, broadcast votes) so tests can
//! assert on them without mocking the component that produced them.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, Weak,
};

/// Collects every value emitted by the listener it was created from.
/// Safe to share between threads.
pub struct OutputTrackerMt<T: Clone + 'static> {
    output: Mutex<Vec<T>>,
}

impl<T: Clone + 'static> OutputTrackerMt<T> {
    pub fn new() -> Self {
        Self {
            output: Mutex::new(Vec::new()),
        }
    }

    pub fn add(&self, value: T) {
        self.output.lock().unwrap().push(value);
    }

    pub fn output(&self) -> Vec<T> {
        self.output.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.output.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.output.lock().unwrap().clear();
    }
}

impl<T: Clone + 'static> Default for OutputTrackerMt<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fans emitted values out to all live trackers.
/// Trackers are held weakly, dropping a tracker stops tracking.
pub struct OutputListenerMt<T: Clone + 'static> {
    trackers: Mutex<Vec<Weak<OutputTrackerMt<T>>>>,
    tracked: AtomicBool,
}

impl<T: Clone + 'static> OutputListenerMt<T> {
    pub fn new() -> Self {
        Self {
            trackers: Mutex::new(Vec::new()),
            tracked: AtomicBool::new(false),
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.tracked.load(Ordering::Relaxed)
    }

    pub fn track(&self) -> Arc<OutputTrackerMt<T>> {
        let tracker = Arc::new(OutputTrackerMt::new());
        self.trackers.lock().unwrap().push(Arc::downgrade(&tracker));
        self.tracked.store(true, Ordering::Relaxed);
        tracker
    }

    pub fn emit(&self, value: T) {
        // fast path, nobody is listening
        if !self.is_tracked() {
            return;
        }

        let mut trackers = self.trackers.lock().unwrap();
        trackers.retain(|weak| match weak.upgrade() {
            Some(tracker) => {
                tracker.add(value.clone());
                true
            }
            None => false,
        });
        self.tracked.store(!trackers.is_empty(), Ordering::Relaxed);
    }

    pub fn tracker_count(&self) -> usize {
        self.trackers.lock().unwrap().len()
    }
}

impl<T: Clone + 'static> Default for OutputListenerMt<T> {
    fn default() -> Self {
        Self::new()
    }
}
