
use super::BlockValidator;
use crate::{
    block_insertion::BlockInsertInstructions, BlockStatus, SignatureVerification,
    LEDGER_CONSTANTS_STUB,
};
use lattice_core::{
    work::WORK_THRESHOLDS_STUB, Account, Amount, Block, Epoch, PendingInfo, SavedAccountChain,
};

/// Validates a single block against an in-memory account chain.
/// Ledger lookups are replaced by flags, so no store is involved.
pub(crate) struct ValidationCase {
    pub now: u64,
    pub chain: SavedAccountChain,
    block: Option<Block>,
    pending: Option<PendingInfo>,
    exists: bool,
    source_missing: bool,
    previous_missing: bool,
    burn_account: bool,
    verification: SignatureVerification,
}

impl ValidationCase {
    pub fn unopened() -> Self {
        Self {
            now: 987_654,
            chain: SavedAccountChain::new(),
            block: None,
            pending: None,
            exists: false,
            source_missing: false,
            previous_missing: false,
            burn_account: false,
            verification: SignatureVerification::Unknown,
        }
    }

    /// Account opened with a state block holding 1000 raw
    pub fn epoch0() -> Self {
        Self::unopened().with_chain(|chain| {
            chain.add_random_open_block();
        })
    }

    pub fn epoch1() -> Self {
        Self::epoch0().with_chain(|chain| {
            chain.add_epoch_v1();
        })
    }

    pub fn epoch2() -> Self {
        Self::epoch1().with_chain(|chain| {
            chain.add_epoch_v2();
        })
    }

    /// Account opened with a legacy open block holding 1 raw
    pub fn legacy() -> Self {
        Self::unopened().with_chain(|chain| {
            chain.add_legacy_open();
        })
    }

    pub fn with_chain(mut self, setup: impl FnOnce(&mut SavedAccountChain)) -> Self {
        setup(&mut self.chain);
        self
    }

    pub fn validate_block(mut self, create: impl FnOnce(&SavedAccountChain) -> Block) -> Self {
        self.block = Some(create(&self.chain));
        self
    }

    pub fn receivable(mut self, amount: u128, epoch: Epoch) -> Self {
        self.pending = Some(PendingInfo::new(Account::from(42), Amount::raw(amount), epoch));
        self
    }

    pub fn already_exists(mut self) -> Self {
        self.exists = true;
        self
    }

    pub fn source_missing(mut self) -> Self {
        self.source_missing = true;
        self
    }

    pub fn previous_missing(mut self) -> Self {
        self.previous_missing = true;
        self
    }

    pub fn for_burn_account(mut self) -> Self {
        self.burn_account = true;
        self
    }

    pub fn signature_checked_as(mut self, verification: SignatureVerification) -> Self {
        self.verification = verification;
        self
    }

    pub fn block(&self) -> &Block {
        self.block.as_ref().unwrap()
    }

    pub fn expect_error(&self, expected: BlockStatus) {
        assert_eq!(self.run(), Err(expected));
    }

    pub fn expect_valid(&self) -> BlockInsertInstructions {
        match self.run() {
            Ok(instructions) => instructions,
            Err(status) => panic!("block was rejected: {}", status.as_str()),
        }
    }

    fn run(&self) -> Result<BlockInsertInstructions, BlockStatus> {
        let account = self.chain.account();
        let opened = self.chain.height() > 0;
        let validator = BlockValidator {
            block: self.block(),
            epochs: &LEDGER_CONSTANTS_STUB.epochs,
            work: &WORK_THRESHOLDS_STUB,
            burn_account: if self.burn_account {
                account
            } else {
                Account::zero()
            },
            block_exists: self.exists,
            account,
            previous_block: (opened && !self.previous_missing && !self.block().is_open())
                .then(|| self.chain.latest_block().clone()),
            old_account_info: opened.then(|| self.chain.account_info()),
            pending_receive_info: self.pending.clone(),
            any_pending_exists: self.pending.is_some(),
            source_block_exists: !self.source_missing,
            seconds_since_epoch: self.now,
            verification: self.verification,
        };
        validator.validate()
    }
}
