//! Video-call meeting support.
//!
//! Generates unique room slugs and builds deep links into the hosted
//! video-conferencing service.
//!
//! # Components
//!
//! - `room` - CSPRNG-backed room slug generation
//! - `link` - pure meeting-link construction with fragment parameters

pub mod link;
pub mod room;

pub use link::build_meeting_link;
pub use room::RoomSlug;
