//! # Built-in Adapters
//!
//! Thin typed wrappers over well-known remote types. These contain no
//! bridge logic: each one declares its remote type name and adds local
//! convenience methods expressed through delegation. The service registers
//! [`Contract`], [`PrivateKey`], [`PublicKey`] and [`KeyAddress`] at
//! start-up; the others follow the same contract and can be registered by
//! extension code via [`crate::service::Service::register`].

use std::sync::Arc;

use crate::adapter::{Adapted, Adapter, Bridged};
use crate::error::{Error, Result};
use crate::remote;
use crate::service::Service;
use crate::value::Value;

macro_rules! declare_adapter {
    ($(#[$meta:meta])* $name:ident => $remote:literal) => {
        $(#[$meta])*
        pub struct $name {
            base: Adapter,
        }

        impl Adapted for $name {
            const REMOTE_TYPE: &'static str = $remote;

            fn wrap(base: Adapter) -> Self {
                Self { base }
            }

            fn base(&self) -> &Adapter {
                &self.base
            }
        }
    };
}

declare_adapter! {
    /// A smart contract in the remote host.
    Contract => "com.icodici.universa.contract.Contract"
}

declare_adapter! {
    /// A private key held by the remote host's crypto layer.
    PrivateKey => "com.icodici.crypto.PrivateKey"
}

declare_adapter! {
    /// A public key.
    PublicKey => "com.icodici.crypto.PublicKey"
}

declare_adapter! {
    /// A key address, short or long form.
    KeyAddress => "com.icodici.crypto.KeyAddress"
}

declare_adapter! {
    /// A contract role.
    Role => "com.icodici.universa.contract.roles.Role"
}

declare_adapter! {
    /// Permission to change a contract's owner.
    ChangeOwnerPermission =>
        "com.icodici.universa.contract.permissions.ChangeOwnerPermission"
}

declare_adapter! {
    /// String-keyed remote map with get/set helpers.
    Binder => "net.sergeych.tools.Binder"
}

impl Contract {
    /// Creates a simple contract with the critical parts preset:
    ///
    /// - expiration set to `expires_at` (a host-understood time value)
    /// - issuer role set to the issuer key's address, short or long
    /// - creator and owner roles linked to the issuer
    /// - change-owner permission linked to the owner
    ///
    /// The contract is signed by the issuer key but not sealed; callers
    /// usually add more data and then call [`Contract::seal`].
    pub fn create(
        service: &Service,
        issuer_key: &PrivateKey,
        expires_at: Value,
        use_short_address: bool,
    ) -> Result<Arc<Self>> {
        let contract = service.instantiate::<Contract>(&[])?;
        contract.invoke("setExpiresAt", &[expires_at])?;

        let address = if use_short_address {
            issuer_key.short_address()?
        } else {
            issuer_key.long_address()?
        };
        contract.invoke("setIssuerKeys", &[address.to_value()])?;

        let issuer = contract.issuer()?;
        let owner_link = issuer.invoke("linkAs", &[Value::from("owner")])?;
        contract.invoke("registerRole", &[owner_link.to_value()])?;
        let creator_link = issuer.invoke("linkAs", &[Value::from("creator")])?;
        contract.invoke("registerRole", &[creator_link.to_value()])?;

        let at_owner = contract.owner()?.invoke("linkAs", &[Value::from("@owner")])?;
        let permission = service.instantiate::<ChangeOwnerPermission>(&[at_owner.to_value()])?;
        contract.invoke("addPermission", &[permission.to_value()])?;

        contract.invoke("addSignerKey", &[issuer_key.to_value()])?;
        Ok(contract)
    }

    /// Loads a contract from a packed transaction.
    pub fn from_packed(service: &Service, packed: &[u8]) -> Result<Bridged> {
        service.invoke_static::<Contract>("fromPackedTransaction", &[Value::from(packed.to_vec())])
    }

    /// Seals the contract, returning its packed binary form.
    pub fn seal(&self) -> Result<Vec<u8>> {
        expect_bytes("seal", self.invoke("seal", &[])?)
    }

    /// Packed transaction with the sealed contract and its counterparts.
    /// Call [`Contract::seal`] somewhere before.
    pub fn packed(&self) -> Result<Vec<u8>> {
        expect_bytes("getPackedTransaction", self.invoke("getPackedTransaction", &[])?)
    }

    pub fn is_ok(&self) -> Result<bool> {
        self.invoke("isOk", &[])?.as_bool().ok_or_else(|| {
            Error::Connection(remote::Error::Protocol(
                "isOk did not return a boolean".into(),
            ))
        })
    }

    pub fn hash_id(&self) -> Result<Bridged> {
        self.invoke("getId", &[])
    }

    pub fn expires_at(&self) -> Result<Bridged> {
        self.invoke("getExpiresAt", &[])
    }

    pub fn issuer(&self) -> Result<Bridged> {
        self.invoke("getIssuer", &[])
    }

    pub fn owner(&self) -> Result<Bridged> {
        self.invoke("getOwner", &[])
    }

    pub fn creator(&self) -> Result<Bridged> {
        self.invoke("getCreator", &[])
    }

    /// Definition data section.
    pub fn definition(&self) -> Result<Bridged> {
        self.invoke("getDefinition", &[])?.invoke("getData", &[])
    }

    /// Errors found by the last check, as reported by the host.
    pub fn errors(&self) -> Result<Bridged> {
        self.invoke("getErrors", &[])
    }

    /// Keys the contract will be signed with on the next seal.
    pub fn keys_to_sign_with(&self) -> Result<Bridged> {
        self.invoke("getKeysToSignWith", &[])
    }
}

impl PrivateKey {
    pub fn public_key(&self) -> Result<Bridged> {
        self.invoke("getPublicKey", &[])
    }

    pub fn short_address(&self) -> Result<Bridged> {
        self.invoke("getShortAddress", &[])
    }

    pub fn long_address(&self) -> Result<Bridged> {
        self.invoke("getLongAddress", &[])
    }
}

impl PublicKey {
    pub fn short_address(&self) -> Result<Bridged> {
        self.invoke("getShortAddress", &[])
    }

    pub fn long_address(&self) -> Result<Bridged> {
        self.invoke("getLongAddress", &[])
    }
}

impl KeyAddress {
    pub fn packed(&self) -> Result<Vec<u8>> {
        expect_bytes("getPacked", self.invoke("getPacked", &[])?)
    }
}

impl Role {
    /// A copy of this role registered under another name.
    pub fn link_as(&self, name: &str) -> Result<Bridged> {
        self.invoke("linkAs", &[Value::from(name)])
    }
}

impl Binder {
    pub fn get(&self, key: &str) -> Result<Bridged> {
        self.invoke("get", &[Value::from(key)])
    }

    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        self.invoke("set", &[Value::from(key), value])?;
        Ok(())
    }
}

fn expect_bytes(what: &str, result: Bridged) -> Result<Vec<u8>> {
    result.as_bytes().map(<[u8]>::to_vec).ok_or_else(|| {
        Error::Connection(remote::Error::Protocol(format!(
            "{} did not return bytes",
            what
        )))
    })
}
