#![doc = include_str!("../README.md")]

mod codec;
pub use codec::{decrypt, encrypt, SECRET_FORMAT_VERSION};
mod error;
pub use error::CryptoError;
mod key;
pub use key::SecretKey;
