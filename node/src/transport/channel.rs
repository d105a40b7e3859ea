use super::Message;
use lattice_output_tracker::{OutputListenerMt, OutputTrackerMt};
use std::{
    fmt::Display,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

#[derive(PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord, Default, Debug)]
pub struct ChannelId(usize);

impl ChannelId {
    pub const LOOPBACK: Self = Self(0);
    pub const MIN: Self = Self(usize::MIN);
    pub const MAX: Self = Self(usize::MAX);

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<usize> for ChannelId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

/// A connection to a peer. Sent messages are handed to the attached sink
/// and can be observed with `track_sent`
pub struct Channel {
    channel_id: ChannelId,
    closed: AtomicBool,
    sink: Option<Box<dyn Fn(&Message) + Send + Sync>>,
    send_listener: OutputListenerMt<Message>,
}

impl Channel {
    pub fn new(channel_id: ChannelId) -> Self {
        Self {
            channel_id,
            closed: AtomicBool::new(false),
            sink: None,
            send_listener: OutputListenerMt::new(),
        }
    }

    pub fn new_with_sink(
        channel_id: ChannelId,
        sink: impl Fn(&Message) + Send + Sync + 'static,
    ) -> Self {
        Self {
            sink: Some(Box::new(sink)),
            ..Self::new(channel_id)
        }
    }

    pub fn new_test_instance() -> Arc<Self> {
        Arc::new(Self::new(ChannelId::from(42)))
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    /// Returns false if the channel is closed
    pub fn send(&self, message: &Message) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.send_listener.emit(message.clone());
        if let Some(sink) = &self.sink {
            sink(message);
        }
        true
    }

    pub fn track_sent(&self) -> Arc<OutputTrackerMt<Message>> {
        self.send_listener.track()
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_alive(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }
}
