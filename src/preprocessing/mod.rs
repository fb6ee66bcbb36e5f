//! Audio preprocessing modules
//!
//! Utilities that prepare raw channels for onset analysis:
//! - Channel mixing (multi-channel to mono)
//! - One-pole bass/high band split

pub mod channel_mixer;
