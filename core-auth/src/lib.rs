//! # Authentication Module
//!
//! Client-side session state and the login callback flow.
//!
//! ## Overview
//!
//! - [`SessionStore`] persists tokens, the user profile and the authenticated
//!   flag in host storage and announces changes on the event bus.
//! - [`CallbackFlow`] runs the identity provider callback, parameterized by an
//!   [`InputResolver`] ([`CodeExchange`] or [`UrlTokens`]).
//! - [`AuthApi`] talks to the backend code-exchange and logout endpoints.
//!
//! ## Features
//!
//! - Synchronous reads for first-paint rendering
//! - Legacy storage key fallback through one compatibility shim
//! - Best-effort server-side logout
//! - Cancellable delayed redirect after login

pub mod api;
pub mod callback;
pub mod error;
pub mod keys;
pub mod redirect;
pub mod session_store;
pub mod types;

pub use api::{AuthApi, ExchangeResponse};
pub use callback::{
    CallbackFlow, CallbackOutcome, CodeExchange, InputResolver, ResolvedSession, UrlTokens,
};
pub use error::{AuthError, Result};
pub use redirect::{schedule_redirect, RedirectHandle};
pub use session_store::SessionStore;
pub use types::{CallbackParams, CallbackState, Session, SessionTokens, TokenGrant, UserProfile};
