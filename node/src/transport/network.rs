use super::{Channel, ChannelId, Message};
use crate::stats::{Direction, StatType, Stats};
use lattice_output_tracker::{OutputListenerMt, OutputTrackerMt};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tracing::trace;

/// The realtime channels of this node
pub struct Network {
    stats: Arc<Stats>,
    channels: Mutex<NetworkState>,
    flood_listener: OutputListenerMt<Message>,
}

struct NetworkState {
    by_id: HashMap<ChannelId, Arc<Channel>>,
    next_id: usize,
}

impl Network {
    pub fn new(stats: Arc<Stats>) -> Self {
        Self {
            stats,
            channels: Mutex::new(NetworkState {
                by_id: HashMap::new(),
                // 0 is the loopback channel
                next_id: 1,
            }),
            flood_listener: OutputListenerMt::new(),
        }
    }

    /// Registers a channel with a new id
    pub fn add(&self, sink: impl Fn(&Message) + Send + Sync + 'static) -> Arc<Channel> {
        let mut state = self.channels.lock().unwrap();
        let channel_id = ChannelId::from(state.next_id);
        state.next_id += 1;
        let channel = Arc::new(Channel::new_with_sink(channel_id, sink));
        state.by_id.insert(channel_id, channel.clone());
        channel
    }

    pub fn insert(&self, channel: Arc<Channel>) {
        self.channels
            .lock()
            .unwrap()
            .by_id
            .insert(channel.channel_id(), channel);
    }

    pub fn get(&self, channel_id: ChannelId) -> Option<Arc<Channel>> {
        self.channels.lock().unwrap().by_id.get(&channel_id).cloned()
    }

    pub fn remove(&self, channel_id: ChannelId) {
        self.channels.lock().unwrap().by_id.remove(&channel_id);
    }

    pub fn list(&self) -> Vec<Arc<Channel>> {
        self.channels
            .lock()
            .unwrap()
            .by_id
            .values()
            .filter(|c| c.is_alive())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.channels.lock().unwrap().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn send(&self, channel: &Channel, message: &Message) -> bool {
        let sent = channel.send(message);
        if sent {
            self.stats
                .inc_dir(StatType::Message, message.detail_type(), Direction::Out);
        }
        sent
    }

    /// Sends the message to all live channels
    pub fn flood(&self, message: &Message) {
        self.flood_listener.emit(message.clone());
        let channels: Vec<_> = self
            .channels
            .lock()
            .unwrap()
            .by_id
            .values()
            .cloned()
            .collect();
        trace!(channels = channels.len(), ?message, "Flood");
        for channel in channels {
            self.send(&channel, message);
        }
        self.channels
            .lock()
            .unwrap()
            .by_id
            .retain(|_, c| c.is_alive());
    }

    pub fn track_floods(&self) -> Arc<OutputTrackerMt<Message>> {
        self.flood_listener.track()
    }
}
