//! anikoto.to: a `/filter` search listing, AJAX episode and server listings,
//! an embedded player with its own sources API, and an alternate quality
//! mapper keyed by MyAnimeList id.

mod builder;
mod filter;
mod models;
pub mod parse;
pub mod pipeline;

pub use builder::Anikoto;

pub const NAME: &str = "anikoto";
