#![doc = include_str!("../README.md")]

mod context;
pub use context::AttemptContext;
mod engine;
pub use engine::Tfa;
mod error;
pub use error::TfaError;
mod form;
pub use form::{ChallengeOptions, FieldKind, FormField, FormState, FALLBACK_ACTION};
mod ids;
pub use ids::{PluginId, UserId};
pub mod plugin;
pub use plugin::{LoginPlugin, SendPlugin, SetupPlugin, TfaPlugin, ValidationPlugin};
mod service;
pub use service::TfaService;
mod settings;
pub use settings::{FloodWindow, TfaSettings};
mod setup;
pub use setup::TfaSetup;
pub mod skip;
pub use skip::SkipPolicy;
pub mod store;
pub use store::{
    FloodBackend, PluginFactory, StoreError, UserDataStore, UserLookup, UserRecord,
};
