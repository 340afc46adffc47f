//! Hyperloop station pod tracking.
//!
//! A station keeps transit pods on doubly-linked tracks: two waiting
//! tracks fed by pod class and a launched loop, with passengers boarded
//! around pods that stop responding.

pub mod pod;
pub mod station;
pub mod track;
