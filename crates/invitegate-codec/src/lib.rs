//! # invitegate-codec
//!
//! Generation and validation of self-checksumming invite codes.
//!
//! A code is 8 symbols over a configurable alphabet: 7 data symbols drawn
//! from a CSPRNG plus one checksum symbol interleaved at index 3, rendered
//! with a separator as `XXXX-XXXX`. The checksum lets the service reject
//! the vast majority of malformed or guessed codes without touching the
//! lock or the durable store.

mod codec;

pub use codec::InviteCodec;
