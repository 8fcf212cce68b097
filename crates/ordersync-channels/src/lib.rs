//! # OrderSync Channels
//! Where run results are posted.

pub mod cliq;

pub use cliq::CliqChannel;
