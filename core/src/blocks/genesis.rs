use super::{Block, BlockDetails, BlockSideband};
use crate::{Amount, BlockHash, Epoch};
use std::sync::LazyLock;

static DEV_GENESIS_JSON: &str = r###"{
    "type": "open",
    "source": "B0311EA55708D6A53C75CDBF88300259C6D018522FE3D4D0A242E431F9E8B6D0",
    "representative": "xrb_3e3j5tkog48pnny9dmfzj1r16pg8t1e76dz5tmac6iq689wyjfpiij4txtdo",
    "account": "xrb_3e3j5tkog48pnny9dmfzj1r16pg8t1e76dz5tmac6iq689wyjfpiij4txtdo",
    "work": "7b42a00ee91d5810",
    "signature": "ECDA914373A2F0CA1296475BAEE40500A7F0A7AD72A5A80C81D7FAB7F6C802B2CC7DB50F5DD0FB25B2EF11761FA7344A158DD5A700B21BD47DE5BD0F63153A02"
}"###;

/// Open block of the dev network genesis account. It receives the whole supply.
pub static DEV_GENESIS_BLOCK: LazyLock<Block> = LazyLock::new(|| {
    serde_json::from_str(DEV_GENESIS_JSON).expect("dev genesis block is valid json")
});

/// Sideband the ledger stores for a genesis open block
pub fn genesis_sideband(genesis: &Block, timestamp: u64) -> BlockSideband {
    BlockSideband::new(
        genesis.account_field().unwrap_or_default(),
        BlockHash::zero(),
        Amount::MAX,
        1,
        timestamp,
        BlockDetails::new(Epoch::Epoch0, false, true, false),
        Epoch::Epoch0,
    )
}
