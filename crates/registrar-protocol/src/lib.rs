//! Protocol layer for Registrar.
//!
//! This crate defines what a call looks like and what its answer means:
//!
//! - **Types** ([`RequestDescriptor`], [`ResponseEnvelope`],
//!   [`UserIdentity`], ...): the values callers build and receive.
//! - **Classification** ([`classify`]): the status/body rules that turn a
//!   raw response into an envelope, or flag it as unauthorized.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): body encoding.
//! - **Endpoints** ([`endpoints`]): descriptor constructors for every
//!   route the backing service exposes.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (descriptor / envelope) → Gateway (retry) → Session
//! ```

mod classify;
mod codec;
pub mod endpoints;
mod error;
mod types;

pub use classify::{
    Classified, GENERIC_ERROR_MESSAGE, STATUS_NO_CONTENT, STATUS_UNAUTHORIZED, classify,
    error_message,
};
pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use registrar_transport::Method;
pub use types::{
    Credentials, RequestDescriptor, ResponseEnvelope, SignInResponse, UserId, UserIdentity,
};
