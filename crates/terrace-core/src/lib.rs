//! Core analysis for river terrace long profiles.
//!
//! Loads terrace and baseline-channel survey tables from prefixed CSV
//! files, groups the terrace points by id, and reduces each qualifying
//! group to an elevation-versus-distance long profile. Plotting and the
//! command line live in the tool crates; this crate is pure data work.

pub mod error;
pub mod profile;
pub mod survey;

pub use error::SurveyError;
pub use profile::{
    compute_channel_profile, compute_long_profiles, ChannelProfile, LongProfileSet, ProfileFilter,
    TerraceProfile,
};
pub use survey::{read_channel_csv, read_terrace_csv, ChannelRecord, SurveyPaths, TerraceRecord};
