mod wallet_representatives;

pub use wallet_representatives::WalletRepresentatives;
