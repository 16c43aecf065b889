//! Typed views over the UBX message payloads this receiver subsystem uses.
//!
//! Each message keeps its wire layout behind a named offset table and a
//! zero-copy `*Ref` accessor struct validated once at construction.

pub mod ack;
pub mod cfg_val;
pub mod mon_ver;
pub mod nav_pvt;
