use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use eyre::WrapErr;
use std::{fmt, str::FromStr};

/// The single wallet funds are bridged from.
///
/// The key is only used by [`TransactionSubmitter`](crate::transactions::TransactionSubmitter)
/// and is never printed: the [`Debug`] impl shows the address only.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Loads a wallet from a hex encoded private key.
    pub fn from_private_key(key: &str) -> eyre::Result<Self> {
        let signer = PrivateKeySigner::from_str(key.trim()).wrap_err("invalid private key")?;
        Ok(Self { signer })
    }

    /// Address derived from the private key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub(crate) const fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl From<PrivateKeySigner> for Wallet {
    fn from(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet").field("address", &self.address()).finish()
    }
}
