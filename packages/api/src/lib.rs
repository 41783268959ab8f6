//! # API crate: hosted backend access for WebCarros
//!
//! Every page talks to the backend through the collaborator traits defined in
//! `store` ([`store::IdentityService`], [`store::DocumentStore`],
//! [`store::ObjectStore`]). This crate provides the implementations and the
//! switch between them.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`backend`] | [`Backend`]: the Firebase clients or the in-memory demo, selected from `webcarros.toml` |
//! | [`firebase`] | Identity Toolkit, Firestore and Cloud Storage REST clients plus the Firestore value codec |
//! | [`tokens`] | Sign-in tokens persisted across reloads |

pub mod backend;
pub mod firebase;
pub mod tokens;

pub use backend::{Backend, ConfigError, DEMO_EMAIL, DEMO_PASSWORD};
pub use firebase::FirebaseBackend;
