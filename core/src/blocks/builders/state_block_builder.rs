use super::stub_work;
use crate::{
    Account, Amount, Block, BlockBase, BlockHash, EpochBlockArgs, Link, PrivateKey, PublicKey,
    Signature, StateBlock, StateBlockArgs,
};
use anyhow::Result;

pub struct StateBlockBuilder {
    account: Option<Account>,
    previous: BlockHash,
    representative: PublicKey,
    balance: Amount,
    link: Link,
    priv_key: PrivateKey,
    work: Option<u64>,
    signature: Option<Signature>,
    previous_balance: Option<Amount>,
}

impl StateBlockBuilder {
    pub fn new() -> Self {
        Self {
            account: None,
            previous: BlockHash::from(2),
            representative: PublicKey::from(3),
            balance: Amount::raw(4),
            link: Link::from(5),
            priv_key: PrivateKey::new(),
            previous_balance: None,
            work: None,
            signature: None,
        }
    }

    pub fn from(mut self, other: &StateBlock) -> Self {
        self.account = Some(other.account());
        self.previous = other.previous();
        self.representative = other.representative();
        self.balance = other.balance();
        self.link = other.link();
        self.signature = Some(other.block_signature().clone());
        self.work = Some(other.work());
        self
    }

    pub fn previous_balance(mut self, balance: Amount) -> Self {
        self.previous_balance = Some(balance);
        self
    }

    /// Sets an account that differs from the signing key
    pub fn account(mut self, account: impl Into<Account>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn account_address(self, address: impl AsRef<str>) -> Result<Self> {
        Ok(self.account(Account::decode_account(address)?))
    }

    pub fn previous(mut self, previous: impl Into<BlockHash>) -> Self {
        self.previous = previous.into();
        self
    }

    pub fn representative(mut self, rep: impl Into<PublicKey>) -> Self {
        self.representative = rep.into();
        self
    }

    pub fn balance(mut self, balance: impl Into<Amount>) -> Self {
        self.balance = balance.into();
        self
    }

    /// Requires previous_balance
    pub fn amount_sent(self, amount: impl Into<Amount>) -> Self {
        let previous_balance = self
            .previous_balance
            .expect("previous balance not specified");
        self.balance(previous_balance - amount.into())
    }

    /// Requires previous_balance
    pub fn amount_received(self, amount: impl Into<Amount>) -> Self {
        let previous_balance = self
            .previous_balance
            .expect("previous balance not specified");
        self.balance(previous_balance + amount.into())
    }

    pub fn link(mut self, link: impl Into<Link>) -> Self {
        self.link = link.into();
        self
    }

    pub fn key(mut self, key: &PrivateKey) -> Self {
        self.signature = None;
        self.priv_key = key.clone();
        self
    }

    pub fn signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn work(mut self, work: u64) -> Self {
        self.work = Some(work);
        self
    }

    pub fn build(self) -> Block {
        let account = self.account.unwrap_or_else(|| self.priv_key.account());
        let work = self.work.unwrap_or_else(|| {
            let root = if self.previous.is_zero() {
                account.into()
            } else {
                self.previous.into()
            };
            stub_work(root)
        });

        let mut block: Block = match self.account {
            // the epoch constructor signs for a foreign account
            Some(account) => EpochBlockArgs {
                epoch_signer: &self.priv_key,
                account,
                previous: self.previous,
                representative: self.representative,
                balance: self.balance,
                link: self.link,
                work,
            }
            .into(),
            None => StateBlockArgs {
                key: &self.priv_key,
                previous: self.previous,
                representative: self.representative,
                balance: self.balance,
                link: self.link,
                work,
            }
            .into(),
        };

        if let Some(signature) = self.signature {
            block.set_block_signature(&signature);
        }

        block
    }
}

impl Default for StateBlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
