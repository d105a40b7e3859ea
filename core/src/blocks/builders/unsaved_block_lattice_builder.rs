use super::stub_work;
use crate::{
    epoch_v1_link, epoch_v2_link, Account, Amount, Block, BlockHash, Epoch, EpochBlockArgs, Link,
    PendingInfo, PendingKey, PrivateKey, PublicKey, Root, StateBlockArgs, DEV_GENESIS_BLOCK,
    DEV_GENESIS_KEY,
};
use std::collections::HashMap;

/// Builds valid chains of blocks for a dev network ledger without touching a ledger.
/// It keeps track of every account frontier and of the receivable amounts.
#[derive(Clone)]
pub struct UnsavedBlockLatticeBuilder {
    accounts: HashMap<Account, Frontier>,
    pending_receives: HashMap<PendingKey, PendingInfo>,
}

#[derive(Clone)]
struct Frontier {
    hash: BlockHash,
    representative: PublicKey,
    balance: Amount,
}

impl UnsavedBlockLatticeBuilder {
    pub fn new() -> Self {
        let mut accounts = HashMap::new();
        accounts.insert(
            DEV_GENESIS_KEY.account(),
            Frontier {
                hash: DEV_GENESIS_BLOCK.hash(),
                representative: DEV_GENESIS_KEY.public_key(),
                balance: Amount::MAX,
            },
        );
        Self {
            accounts,
            pending_receives: Default::default(),
        }
    }

    pub fn genesis(&mut self) -> UnsavedAccountChainBuilder {
        self.account(&DEV_GENESIS_KEY)
    }

    pub fn account<'a>(&'a mut self, key: &'a PrivateKey) -> UnsavedAccountChainBuilder<'a> {
        UnsavedAccountChainBuilder { lattice: self, key }
    }

    /// Opens an account that only has receivables with an epoch block
    pub fn epoch_open(&mut self, account: impl Into<Account>) -> Block {
        let account = account.into();
        assert!(!self.accounts.contains_key(&account));
        assert!(self
            .pending_receives
            .keys()
            .any(|k| k.receiving_account == account));

        let open: Block = EpochBlockArgs {
            epoch_signer: &DEV_GENESIS_KEY,
            account,
            previous: BlockHash::zero(),
            representative: PublicKey::zero(),
            balance: Amount::zero(),
            link: epoch_v1_link(),
            work: stub_work(account.into()),
        }
        .into();

        self.accounts.insert(
            account,
            Frontier {
                hash: open.hash(),
                representative: PublicKey::zero(),
                balance: Amount::zero(),
            },
        );

        open
    }
}

impl Default for UnsavedBlockLatticeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct UnsavedAccountChainBuilder<'a> {
    lattice: &'a mut UnsavedBlockLatticeBuilder,
    key: &'a PrivateKey,
}

impl<'a> UnsavedAccountChainBuilder<'a> {
    pub fn send_all_except(
        &mut self,
        destination: impl Into<Account>,
        keep: impl Into<Amount>,
    ) -> Block {
        let frontier = self.get_frontier();
        self.send(destination, frontier.balance - keep.into())
    }

    pub fn send(&mut self, destination: impl Into<Account>, amount: impl Into<Amount>) -> Block {
        let destination = destination.into();
        let frontier = self.get_frontier();
        let amount = amount.into();
        let new_balance = frontier.balance - amount;

        let send: Block = StateBlockArgs {
            key: self.key,
            previous: frontier.hash,
            representative: frontier.representative,
            balance: new_balance,
            link: destination.into(),
            work: stub_work(frontier.hash.into()),
        }
        .into();

        self.set_new_frontier(Frontier {
            hash: send.hash(),
            representative: frontier.representative,
            balance: new_balance,
        });

        self.lattice.pending_receives.insert(
            PendingKey::new(destination, send.hash()),
            PendingInfo::new(self.key.account(), amount, Epoch::Epoch0),
        );

        send
    }

    pub fn receive(&mut self, corresponding_send: &Block) -> Block {
        assert_eq!(corresponding_send.destination_or_link(), self.key.account());
        let amount = self
            .lattice
            .pending_receives
            .remove(&PendingKey::new(
                self.key.account(),
                corresponding_send.hash(),
            ))
            .expect("no pending receive found")
            .amount;

        let frontier = self.get_frontier_or_empty();

        let root: Root = if frontier.hash.is_zero() {
            self.key.account().into()
        } else {
            frontier.hash.into()
        };

        let new_balance = frontier.balance + amount;

        let receive: Block = StateBlockArgs {
            key: self.key,
            previous: frontier.hash,
            representative: frontier.representative,
            balance: new_balance,
            link: corresponding_send.hash().into(),
            work: stub_work(root),
        }
        .into();

        self.set_new_frontier(Frontier {
            hash: receive.hash(),
            representative: frontier.representative,
            balance: new_balance,
        });

        receive
    }

    pub fn change(&mut self, new_representative: impl Into<PublicKey>) -> Block {
        let frontier = self.get_frontier();
        let new_representative = new_representative.into();
        let change: Block = StateBlockArgs {
            key: self.key,
            previous: frontier.hash,
            representative: new_representative,
            balance: frontier.balance,
            link: Link::zero(),
            work: stub_work(frontier.hash.into()),
        }
        .into();

        self.set_new_frontier(Frontier {
            hash: change.hash(),
            representative: new_representative,
            balance: frontier.balance,
        });

        change
    }

    /// Upgrades the account to the given epoch. Signed by the dev epoch signer.
    pub fn epoch(&mut self, epoch: Epoch) -> Block {
        let frontier = self.get_frontier();
        let link = match epoch {
            Epoch::Epoch2 => epoch_v2_link(),
            _ => epoch_v1_link(),
        };
        let upgrade: Block = EpochBlockArgs {
            epoch_signer: &DEV_GENESIS_KEY,
            account: self.key.account(),
            previous: frontier.hash,
            representative: frontier.representative,
            balance: frontier.balance,
            link,
            work: stub_work(frontier.hash.into()),
        }
        .into();

        self.set_new_frontier(Frontier {
            hash: upgrade.hash(),
            ..frontier
        });

        upgrade
    }

    fn set_new_frontier(&mut self, new_frontier: Frontier) {
        self.lattice
            .accounts
            .insert(self.key.account(), new_frontier);
    }

    fn get_frontier(&self) -> Frontier {
        self.lattice
            .accounts
            .get(&self.key.account())
            .expect("Cannot send/change from unopenend account!")
            .clone()
    }

    fn get_frontier_or_empty(&self) -> Frontier {
        self.lattice
            .accounts
            .get(&self.key.account())
            .cloned()
            .unwrap_or_else(|| Frontier {
                hash: BlockHash::zero(),
                representative: self.key.public_key(),
                balance: Amount::zero(),
            })
    }
}
