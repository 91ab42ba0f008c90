//! Core types, services and trait definitions for the Clubhouse backend.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`repo::Repository`] over a single transaction and
//! [`store::ClubStore`] for the async surface the API layer consumes. The
//! role lifecycle and group-application workflow live in [`service`] and only
//! ever talk to a [`repo::Repository`].

// Native `async fn` in traits; the futures' `Send` bounds are spelled out on
// the trait methods themselves.
#![allow(async_fn_in_trait)]

pub mod application;
pub mod clock;
pub mod credential;
pub mod error;
pub mod group;
pub mod person;
pub mod repo;
pub mod role;
pub mod service;
pub mod store;

mod validate;

pub use error::{Error, Result};
