use super::{
    change_block::JsonChangeBlock, open_block::JsonOpenBlock, receive_block::JsonReceiveBlock,
    send_block::JsonSendBlock, state_block::JsonStateBlock, Block,
};

/// RPC style JSON form of a block, tagged by its `type` field
#[derive(PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonBlock {
    Send(JsonSendBlock),
    Receive(JsonReceiveBlock),
    Open(JsonOpenBlock),
    Change(JsonChangeBlock),
    State(JsonStateBlock),
}

impl From<JsonBlock> for Block {
    fn from(value: JsonBlock) -> Self {
        match value {
            JsonBlock::Send(json) => Block::LegacySend(json.into()),
            JsonBlock::Receive(json) => Block::LegacyReceive(json.into()),
            JsonBlock::Open(json) => Block::LegacyOpen(json.into()),
            JsonBlock::Change(json) => Block::LegacyChange(json.into()),
            JsonBlock::State(json) => Block::State(json.into()),
        }
    }
}

impl From<&Block> for JsonBlock {
    fn from(value: &Block) -> Self {
        value.json_representation()
    }
}

impl serde::Serialize for Block {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&JsonBlock::from(self), serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Block {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <JsonBlock as serde::Deserialize>::deserialize(deserializer).map(Block::from)
    }
}
