use crate::{
    block_cementer::BlockCementer,
    block_insertion::{BlockInserter, BlockValidatorFactory},
    block_rollback::BlockRollbackPerformer,
    DependentBlocksFinder, LedgerConstants, LedgerSetAny, LedgerSetConfirmed, RepWeightCache,
};
use lattice_core::{
    genesis_sideband, utils::seconds_since_epoch, Account, AccountInfo, Amount, Block, BlockHash,
    BlockSubType, ConfirmationHeightInfo, DependentBlocks, Epoch, Link, PublicKey, Root,
    SavedBlock,
};
use lattice_store::{ReadTransaction, Store, Transaction, WriteTransaction};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::{debug, info};

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
#[repr(u8)]
pub enum BlockStatus {
    Progress,      // Hasn't been seen before, signed correctly
    BadSignature,  // Signature was bad, forged or transmission error
    Old,           // Already seen and was valid
    NegativeSpend, // Malicious attempt to spend a negative amount
    Fork,          // Malicious fork based on previous
    /// Source block doesn't exist, has already been received, or requires an account upgrade (epoch blocks)
    Unreceivable,
    GapPrevious,         // Block marked as previous is unknown
    GapSource,           // Block marked as source is unknown
    GapEpochOpenPending, // Block marked as pending blocks required for epoch open block are unknown
    OpenedBurnAccount,   // Block attempts to open the burn account
    /// Balance and amount delta don't match
    BalanceMismatch,
    RepresentativeMismatch, // Representative is changed when it is not allowed
    BlockPosition,          // This block cannot follow the previous block
    InsufficientWork, // Insufficient work for this block, even though it passed the minimal validation
}

impl BlockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockStatus::Progress => "progress",
            BlockStatus::BadSignature => "bad_signature",
            BlockStatus::Old => "old",
            BlockStatus::NegativeSpend => "negative_spend",
            BlockStatus::Fork => "fork",
            BlockStatus::Unreceivable => "unreceivable",
            BlockStatus::GapPrevious => "gap_previous",
            BlockStatus::GapSource => "gap_source",
            BlockStatus::GapEpochOpenPending => "gap_epoch_open_pending",
            BlockStatus::OpenedBurnAccount => "opened_burn_account",
            BlockStatus::BalanceMismatch => "balance_mismatch",
            BlockStatus::RepresentativeMismatch => "representative_mismatch",
            BlockStatus::BlockPosition => "block_position",
            BlockStatus::InsufficientWork => "insufficient_work",
        }
    }

    /// The block can be processed again once the missing dependency arrives
    pub fn is_gap(&self) -> bool {
        matches!(
            self,
            BlockStatus::GapPrevious | BlockStatus::GapSource | BlockStatus::GapEpochOpenPending
        )
    }
}

/// What the caller already knows about the signature of a block it submits
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum SignatureVerification {
    #[default]
    Unknown,
    Invalid,
    Valid,
    /// Checked against the epoch signer
    ValidEpoch,
}

/// A block the ledger accepted
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessedBlock {
    pub block: SavedBlock,
    /// Balance of the account before the block
    pub previous_balance: Amount,
    /// `Valid` or `ValidEpoch`, depending on which key signed the block
    pub verification: SignatureVerification,
}

pub trait LedgerObserver: Send + Sync {
    fn blocks_cemented(&self, _cemented_count: u64) {}
    fn block_rolled_back(&self, _block_type: BlockSubType) {}
    fn block_added(&self, _block_type: BlockSubType) {}
    fn dependent_unconfirmed(&self) {}
}

pub struct NullLedgerObserver {}

impl NullLedgerObserver {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for NullLedgerObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerObserver for NullLedgerObserver {}

pub struct Ledger {
    pub store: Arc<Store>,
    pub rep_weights: Arc<RepWeightCache>,
    pub constants: LedgerConstants,
    pub observer: Arc<dyn LedgerObserver>,
    pruning: AtomicBool,
}

impl Ledger {
    pub fn new(
        store: Arc<Store>,
        constants: LedgerConstants,
        rep_weights: Arc<RepWeightCache>,
    ) -> anyhow::Result<Self> {
        let ledger = Self {
            rep_weights,
            store,
            constants,
            observer: Arc::new(NullLedgerObserver::new()),
            pruning: AtomicBool::new(false),
        };

        ledger.initialize()?;

        Ok(ledger)
    }

    pub fn set_observer(&mut self, observer: Arc<dyn LedgerObserver>) {
        self.observer = observer;
    }

    pub fn read_txn(&self) -> ReadTransaction {
        self.store.tx_begin_read()
    }

    pub fn rw_txn(&self) -> WriteTransaction {
        self.store.tx_begin_write()
    }

    fn initialize(&self) -> anyhow::Result<()> {
        {
            let mut txn = self.rw_txn();
            if self.store.account.count(&txn) == 0 {
                self.add_genesis_block(&mut txn)?;
            }
        }

        let txn = self.read_txn();
        self.rep_weights
            .rebuild(self.store.account.iter(&txn).map(|(_, info)| info));

        let cache = &self.store.cache;
        cache.reset();
        cache
            .block_count
            .store(self.store.block.count(&txn), Ordering::SeqCst);
        cache
            .account_count
            .store(self.store.account.count(&txn), Ordering::SeqCst);
        let cemented: u64 = self
            .store
            .confirmation_height
            .iter(&txn)
            .map(|(_, info)| info.height)
            .sum();
        cache.cemented_count.store(cemented, Ordering::SeqCst);
        cache
            .pruned_count
            .store(self.store.pruned.count(&txn), Ordering::SeqCst);

        debug!(
            blocks = self.block_count(),
            accounts = self.account_count(),
            cemented = self.cemented_count(),
            "ledger initialized"
        );
        Ok(())
    }

    fn add_genesis_block(&self, txn: &mut WriteTransaction) -> anyhow::Result<()> {
        let genesis_block = &self.constants.genesis;
        let genesis_hash = genesis_block.hash();
        let genesis_account = self.constants.genesis_account;
        let representative = genesis_block
            .representative_field()
            .ok_or_else(|| anyhow!("genesis block has no representative"))?;
        let now = seconds_since_epoch();

        let mut sideband = genesis_sideband(genesis_block, now);
        sideband.balance = self.constants.genesis_amount;
        let saved = SavedBlock::new(genesis_block.clone(), sideband);
        self.store.block.put(txn, &saved);
        self.store
            .frontier
            .put(txn, &genesis_hash, &genesis_account);

        self.store.confirmation_height.put(
            txn,
            &genesis_account,
            &ConfirmationHeightInfo::new(1, genesis_hash),
        );

        self.store.account.put(
            txn,
            &genesis_account,
            &AccountInfo {
                head: genesis_hash,
                representative,
                open_block: genesis_hash,
                balance: self.constants.genesis_amount,
                modified: now,
                block_count: 1,
                epoch: Epoch::Epoch0,
            },
        );
        info!(hash = %genesis_hash, "genesis block written");
        Ok(())
    }

    pub fn any(&self) -> LedgerSetAny {
        LedgerSetAny::new(&self.store)
    }

    pub fn confirmed(&self) -> LedgerSetConfirmed {
        LedgerSetConfirmed::new(&self.store)
    }

    pub fn pruning_enabled(&self) -> bool {
        self.pruning.load(Ordering::SeqCst)
    }

    pub fn enable_pruning(&self) {
        self.pruning.store(true, Ordering::SeqCst);
    }

    /// Sum of all receivables of an account
    pub fn account_receivable(
        &self,
        txn: &dyn Transaction,
        account: &Account,
        only_confirmed: bool,
    ) -> Amount {
        let mut result = Amount::zero();

        for (key, info) in self
            .any()
            .account_receivable_upper_bound(txn, *account, BlockHash::zero())
        {
            if !only_confirmed
                || self
                    .confirmed()
                    .block_exists_or_pruned(txn, &key.send_block_hash)
            {
                result = result.wrapping_add(info.amount);
            }
        }

        result
    }

    /// Returns the cached vote weight for the given representative.
    pub fn weight(&self, rep: &PublicKey) -> Amount {
        self.rep_weights.weight(rep)
    }

    /// Return latest block for account, None if there are no blocks for this account
    pub fn latest(&self, txn: &dyn Transaction, account: &Account) -> Option<BlockHash> {
        self.any().account_head(txn, account)
    }

    /// Return latest root for account, account number if there are no blocks for this account
    pub fn latest_root(&self, txn: &dyn Transaction, account: &Account) -> Root {
        match self.account_info(txn, account) {
            Some(info) => info.head.into(),
            None => account.into(),
        }
    }

    pub fn is_epoch_link(&self, link: &Link) -> bool {
        self.constants.epochs.is_epoch_link(link)
    }

    pub fn epoch_link(&self, epoch: Epoch) -> Option<Link> {
        self.constants.epochs.link(epoch).cloned()
    }

    pub(crate) fn update_account(
        &self,
        txn: &mut WriteTransaction,
        account: &Account,
        old_info: &AccountInfo,
        new_info: &AccountInfo,
    ) {
        if !new_info.head.is_zero() {
            if old_info.head.is_zero() && new_info.open_block == new_info.head {
                self.store
                    .cache
                    .account_count
                    .fetch_add(1, Ordering::SeqCst);
            }
            self.store.account.put(txn, account, new_info);
        } else {
            debug_assert!(!self.store.confirmation_height.exists(txn, account));
            self.store.account.del(txn, account);
            self.store
                .cache
                .account_count
                .fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Replaces confirmed blocks below `hash` with entries in the pruned table.
    /// Returns the number of pruned blocks.
    pub fn pruning_action(
        &self,
        txn: &mut WriteTransaction,
        hash: &BlockHash,
        batch_size: u64,
    ) -> anyhow::Result<u64> {
        let mut pruned_count = 0;
        let mut hash = *hash;
        let genesis_hash = self.constants.genesis.hash();

        while !hash.is_zero() && hash != genesis_hash {
            if let Some(block) = self.any().get_block(txn, &hash) {
                if !self.confirmed().block_exists(txn, &hash) {
                    bail!("only confirmed blocks can be pruned");
                }
                self.store.block.del(txn, &hash);
                self.store.pruned.put(txn, &hash);
                hash = block.previous();
                pruned_count += 1;
                self.store.cache.pruned_count.fetch_add(1, Ordering::SeqCst);
                if batch_size > 0 && pruned_count % batch_size == 0 {
                    txn.refresh();
                }
            } else if self.store.pruned.exists(txn, &hash) {
                hash = BlockHash::zero();
            } else {
                bail!("block not found for pruning: {}", hash);
            }
        }

        Ok(pruned_count)
    }

    pub fn dependent_blocks(&self, txn: &dyn Transaction, block: &Block) -> DependentBlocks {
        DependentBlocksFinder::new(self, txn).find_dependent_blocks(block)
    }

    /// All blocks this block depends on are confirmed
    pub fn dependents_confirmed(&self, txn: &dyn Transaction, block: &Block) -> bool {
        self.dependent_blocks(txn, block)
            .iter()
            .all(|hash| self.confirmed().block_exists_or_pruned(txn, hash))
    }

    pub fn block_confirmed(&self, txn: &dyn Transaction, hash: &BlockHash) -> bool {
        self.confirmed().block_exists_or_pruned(txn, hash)
    }

    /// Rollback blocks until `block' doesn't exist or it tries to penetrate the confirmation height
    pub fn rollback(
        &self,
        txn: &mut WriteTransaction,
        block: &BlockHash,
    ) -> anyhow::Result<Vec<SavedBlock>> {
        BlockRollbackPerformer::new(self, txn).roll_back(block)
    }

    pub fn process(
        &self,
        txn: &mut WriteTransaction,
        block: &Block,
    ) -> Result<SavedBlock, BlockStatus> {
        self.process_verified(txn, block, SignatureVerification::Unknown)
            .map(|processed| processed.block)
    }

    /// Like `process`, but trusts `verification` if it vouches for the key that
    /// signed the block. An `Invalid` hint is checked again.
    pub fn process_verified(
        &self,
        txn: &mut WriteTransaction,
        block: &Block,
        verification: SignatureVerification,
    ) -> Result<ProcessedBlock, BlockStatus> {
        let mut validator = BlockValidatorFactory::new(self, txn, block).create_validator();
        validator.verification = verification;
        let instructions = validator.validate()?;

        let previous_balance = instructions.old_account_info.balance;
        let verification = if instructions.is_epoch_block {
            SignatureVerification::ValidEpoch
        } else {
            SignatureVerification::Valid
        };
        let block = BlockInserter::new(self, txn, block, &instructions).insert();
        Ok(ProcessedBlock {
            block,
            previous_balance,
            verification,
        })
    }

    pub fn get_block(&self, txn: &dyn Transaction, hash: &BlockHash) -> Option<SavedBlock> {
        self.store.block.get(txn, hash)
    }

    pub fn account_info(
        &self,
        transaction: &dyn Transaction,
        account: &Account,
    ) -> Option<AccountInfo> {
        self.store.account.get(transaction, account)
    }

    pub fn get_confirmation_height(
        &self,
        txn: &dyn Transaction,
        account: &Account,
    ) -> Option<ConfirmationHeightInfo> {
        self.store.confirmation_height.get(txn, account)
    }

    pub fn confirm(&self, txn: &mut WriteTransaction, hash: BlockHash) -> Vec<SavedBlock> {
        self.confirm_max(txn, hash, 1024 * 128)
    }

    /// Both stack and result set are bounded to limit maximum memory usage
    /// Callers must ensure that the target block was confirmed, and if not, call this function multiple times
    pub fn confirm_max(
        &self,
        txn: &mut WriteTransaction,
        target_hash: BlockHash,
        max_blocks: usize,
    ) -> Vec<SavedBlock> {
        BlockCementer::new(&self.store, self.observer.as_ref(), &self.constants).confirm(
            txn,
            target_hash,
            max_blocks,
        )
    }

    pub fn cemented_count(&self) -> u64 {
        self.store.cache.cemented_count.load(Ordering::SeqCst)
    }

    pub fn block_count(&self) -> u64 {
        self.store.cache.block_count.load(Ordering::SeqCst)
    }

    pub fn account_count(&self) -> u64 {
        self.store.cache.account_count.load(Ordering::SeqCst)
    }

    pub fn pruned_count(&self) -> u64 {
        self.store.cache.pruned_count.load(Ordering::SeqCst)
    }
}
