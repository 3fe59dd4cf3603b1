pub mod channel;
pub mod long_profile;

pub use channel::{compute_channel_profile, ChannelProfile};
pub use long_profile::{compute_long_profiles, LongProfileSet, ProfileFilter, TerraceProfile};
