use crate::{Account, Block, Link, PublicKey};
use num_traits::FromPrimitive;

/// Version of an account chain. Stored in account infos, pending entries and block details.
#[repr(u8)]
#[derive(PartialEq, Eq, Debug, Clone, Copy, FromPrimitive, Hash, Default, PartialOrd, Ord)]
pub enum Epoch {
    Invalid = 0,
    #[default]
    Unspecified = 1,
    Epoch0 = 2,
    Epoch1 = 3,
    Epoch2 = 4,
}

impl Epoch {
    pub const MAX: Epoch = Epoch::Epoch2;

    /// The epoch an epoch block upgrades to from this one
    pub fn successor(&self) -> Option<Epoch> {
        match self {
            Epoch::Epoch0 => Some(Epoch::Epoch1),
            Epoch::Epoch1 => Some(Epoch::Epoch2),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Epoch {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or_else(|| anyhow!("unknown epoch {value}"))
    }
}

// The epoch takes the low 5 bits of the packed block details
const_assert!((Epoch::MAX as u8) < (1 << 5));

#[derive(Clone, Debug, PartialEq)]
struct EpochUpgrade {
    epoch: Epoch,
    signer: PublicKey,
    link: Link,
}

/// The epoch upgrades a network knows, each identified by its link and signing key
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Epochs {
    upgrades: Vec<EpochUpgrade>,
}

impl Epochs {
    pub fn new() -> Self {
        Default::default()
    }

    /// Replaces an earlier registration of the same epoch
    pub fn add(&mut self, epoch: Epoch, signer: PublicKey, link: Link) {
        self.upgrades.retain(|upgrade| upgrade.epoch != epoch);
        self.upgrades.push(EpochUpgrade {
            epoch,
            signer,
            link,
        });
    }

    fn by_epoch(&self, epoch: Epoch) -> Option<&EpochUpgrade> {
        self.upgrades.iter().find(|upgrade| upgrade.epoch == epoch)
    }

    fn by_link(&self, link: &Link) -> Option<&EpochUpgrade> {
        self.upgrades.iter().find(|upgrade| upgrade.link == *link)
    }

    /// A matching link alone does not make an epoch block: anyone can send to an
    /// account whose bytes equal an epoch link. The block must also keep the balance
    /// and the representative and be signed by the epoch signer.
    pub fn is_epoch_link(&self, link: &Link) -> bool {
        self.by_link(link).is_some()
    }

    pub fn link(&self, epoch: Epoch) -> Option<&Link> {
        self.by_epoch(epoch).map(|upgrade| &upgrade.link)
    }

    pub fn signer(&self, epoch: Epoch) -> Option<&PublicKey> {
        self.by_epoch(epoch).map(|upgrade| &upgrade.signer)
    }

    pub fn epoch(&self, link: &Link) -> Option<Epoch> {
        self.by_link(link).map(|upgrade| upgrade.epoch)
    }

    pub fn epoch_signer(&self, link: &Link) -> Option<Account> {
        self.by_link(link).map(|upgrade| upgrade.signer.into())
    }

    /// True if `new_epoch` is exactly one version above `epoch`
    pub fn is_sequential(epoch: Epoch, new_epoch: Epoch) -> bool {
        epoch.successor() == Some(new_epoch)
    }

    pub fn validate_epoch_signature(&self, block: &Block) -> anyhow::Result<()> {
        let link = block.link_field().unwrap_or_default();
        let Some(upgrade) = self.by_link(&link) else {
            bail!("link {} is not an epoch link", link);
        };
        upgrade
            .signer
            .verify(block.hash().as_bytes(), block.block_signature())
    }
}

fn ascii_link(text: &str) -> Link {
    let mut bytes = [0u8; 32];
    bytes[..text.len()].copy_from_slice(text.as_bytes());
    Link::from_bytes(bytes)
}

/// "epoch v1 block" as ascii, padded with zeros
pub fn epoch_v1_link() -> Link {
    ascii_link("epoch v1 block")
}

/// "epoch v2 block" as ascii, padded with zeros
pub fn epoch_v2_link() -> Link {
    ascii_link("epoch v2 block")
}
