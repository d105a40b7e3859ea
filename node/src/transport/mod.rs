mod channel;
mod message;
mod network;
mod realtime_message_handler;

pub use channel::{Channel, ChannelId};
pub use message::{ConfirmAck, ConfirmReq, Message};
pub use network::Network;
pub use realtime_message_handler::RealtimeMessageHandler;
