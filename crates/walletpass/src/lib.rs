//! Build, sign, and verify Apple Wallet `.pkpass` archives.
//!
//! A pass is a ZIP container holding `pass.json`, the declared asset
//! files, a `manifest.json` mapping every entry to its SHA-1 digest,
//! and a detached PKCS#7 `signature` over the manifest. The device
//! re-computes the digests and verifies the signature against Apple's
//! WWDR chain; any byte out of place and the pass is silently refused,
//! which is why everything that gets hashed or signed goes through
//! canonical serialization here.
//!
//! The pipeline is a single synchronous computation over in-memory
//! buffers: validate assets, hash, build the manifest, sign, package.
//! It holds no global state; credentials arrive in an explicit
//! [`SigningConfig`] on every call.

pub mod archive;
pub mod canon;
pub mod digest;
pub mod error;
pub mod manifest;
pub mod pass;
pub mod pipeline;
pub mod sign;
pub mod verify;

// Convenience re-exports
pub use error::{Error, ErrorKind, Result};
pub use manifest::{Manifest, MANIFEST_NAME, PASS_NAME, SIGNATURE_NAME};
pub use pass::{Field, StoreCard, StoreCardPass};
pub use pipeline::{generate_pkpass, AssetSource, PkpassBuilder, REQUIRED_ASSETS};
pub use sign::{CredentialSource, SigningConfig, SigningIdentity};
pub use verify::{verify_pkpass, verify_signature, VerifyError, VerifyReport};
