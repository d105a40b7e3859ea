use super::stub_work;
use crate::{Account, Amount, Block, BlockHash, PrivateKey, SendBlock, SendPayload};

pub struct LegacySendBlockBuilder {
    previous: Option<BlockHash>,
    destination: Option<Account>,
    balance: Option<Amount>,
    previous_balance: Option<Amount>,
    work: Option<u64>,
    priv_key: Option<PrivateKey>,
}

impl LegacySendBlockBuilder {
    pub fn new() -> Self {
        Self {
            previous: None,
            destination: None,
            balance: None,
            previous_balance: None,
            work: None,
            priv_key: None,
        }
    }

    pub fn previous(mut self, hash: BlockHash) -> Self {
        self.previous = Some(hash);
        self
    }

    pub fn destination(mut self, destination: impl Into<Account>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn balance(mut self, balance: impl Into<Amount>) -> Self {
        self.balance = Some(balance.into());
        self
    }

    pub fn previous_balance(mut self, balance: Amount) -> Self {
        self.previous_balance = Some(balance);
        self
    }

    /// Requires previous_balance
    pub fn amount(mut self, amount: impl Into<Amount>) -> Self {
        let previous_balance = self
            .previous_balance
            .expect("no previous balance specified");
        self.balance = Some(previous_balance - amount.into());
        self
    }

    pub fn sign(mut self, priv_key: &PrivateKey) -> Self {
        self.priv_key = Some(priv_key.clone());
        self
    }

    pub fn work(mut self, work: u64) -> Self {
        self.work = Some(work);
        self
    }

    pub fn build(self) -> Block {
        let priv_key = self.priv_key.unwrap_or_default();
        let previous = self.previous.unwrap_or(BlockHash::from(1));
        let payload = SendPayload {
            previous,
            destination: self.destination.unwrap_or(Account::from(2)),
            balance: self.balance.unwrap_or(Amount::raw(3)),
        };
        let work = self.work.unwrap_or_else(|| stub_work(previous.into()));
        SendBlock::sign(payload, &priv_key, work).into()
    }
}

impl Default for LegacySendBlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
