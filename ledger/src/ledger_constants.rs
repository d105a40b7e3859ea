use anyhow::Result;
use lattice_core::{
    epoch_v1_link, epoch_v2_link,
    work::{WorkThresholds, WORK_THRESHOLDS_STUB},
    Account, Amount, Block, BlockHash, Epoch, Epochs, Networks, PublicKey,
    DEV_GENESIS_BLOCK, DEV_GENESIS_KEY,
};
use std::sync::LazyLock;

static LIVE_GENESIS_DATA: &str = r###"{
	"type": "open",
	"source": "E89208DD038FBB269987689621D52292AE9C35941A7484756ECCED92A65093BA",
	"representative": "xrb_3t6k35gi95xu6tergt6p69ck76ogmitsa8mnijtpxm9fkcm736xtoncuohr3",
	"account": "xrb_3t6k35gi95xu6tergt6p69ck76ogmitsa8mnijtpxm9fkcm736xtoncuohr3",
	"work": "62f05417dd3fb691",
	"signature": "9F0C933C8ADE004D808EA1985FA746A7E95BA2A38F867640F53EC8F180BDFE9E2C1268DEAD7C2664F356E37ABA362BC58E46DBA03E523A7B5A19E4B6EB12BB02"
    }"###;

static LIVE_EPOCH_V2_SIGNER: &str =
    "nano_3qb6o6i1tkzr6jwr5s7eehfxwg9x6eemitdinbpi7u8bjjwsgqfj4wzser3x";

pub static LEDGER_CONSTANTS_STUB: LazyLock<LedgerConstants> =
    LazyLock::new(LedgerConstants::unit_test);

pub static DEV_GENESIS_ACCOUNT: LazyLock<Account> =
    LazyLock::new(|| LEDGER_CONSTANTS_STUB.genesis_account);
pub static DEV_GENESIS_PUB_KEY: LazyLock<PublicKey> =
    LazyLock::new(|| LEDGER_CONSTANTS_STUB.genesis_account.into());
pub static DEV_GENESIS_HASH: LazyLock<BlockHash> =
    LazyLock::new(|| LEDGER_CONSTANTS_STUB.genesis.hash());

/// Network wide ledger parameters: genesis, supply, epoch signers and work thresholds
#[derive(Clone)]
pub struct LedgerConstants {
    pub work: WorkThresholds,
    pub genesis: Block,
    pub genesis_account: Account,
    pub genesis_amount: Amount,
    pub burn_account: Account,
    pub epochs: Epochs,
}

impl LedgerConstants {
    pub fn new(work: WorkThresholds, network: Networks) -> Result<Self> {
        let genesis = match network {
            Networks::NanoDevNetwork => DEV_GENESIS_BLOCK.clone(),
            Networks::NanoLiveNetwork => serde_json::from_str(LIVE_GENESIS_DATA)?,
        };
        let genesis_account = genesis
            .account_field()
            .ok_or_else(|| anyhow!("genesis block has no account"))?;

        let epoch_1_signer = PublicKey::from(genesis_account);
        let epoch_2_signer = match network {
            Networks::NanoDevNetwork => DEV_GENESIS_KEY.public_key(),
            Networks::NanoLiveNetwork => Account::decode_account(LIVE_EPOCH_V2_SIGNER)?.into(),
        };

        let mut epochs = Epochs::new();
        epochs.add(Epoch::Epoch1, epoch_1_signer, epoch_v1_link());
        epochs.add(Epoch::Epoch2, epoch_2_signer, epoch_v2_link());

        Ok(Self {
            work,
            genesis,
            genesis_account,
            genesis_amount: Amount::MAX,
            burn_account: Account::zero(),
            epochs,
        })
    }

    pub fn live() -> Result<Self> {
        Self::new(
            WorkThresholds::publish_full().clone(),
            Networks::NanoLiveNetwork,
        )
    }

    pub fn dev() -> Self {
        Self::for_dev_network(WorkThresholds::publish_dev().clone())
    }

    /// Dev network with a work check that accepts any stub work value
    pub fn unit_test() -> Self {
        Self::for_dev_network(WORK_THRESHOLDS_STUB.clone())
    }

    fn for_dev_network(work: WorkThresholds) -> Self {
        // The dev genesis is compiled in, only the live genesis is parsed at runtime
        match Self::new(work, Networks::NanoDevNetwork) {
            Ok(constants) => constants,
            Err(e) => unreachable!("dev ledger constants are valid: {e}"),
        }
    }

    pub fn for_network(network: Networks) -> Result<Self> {
        match network {
            Networks::NanoDevNetwork => Ok(Self::dev()),
            Networks::NanoLiveNetwork => Self::live(),
        }
    }
}
