//! Repository implementations.

pub mod invite;

pub use invite::InviteRepository;
