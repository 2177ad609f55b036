//! # SHOUT! client
//!
//! A Rust client library for posting events and announcements to a SHOUT!
//! notification server.
//!
//! ## Features
//!
//! - Post OK / not-OK events for a topic and get the resulting topic state back
//! - Post announcements, which are always delivered
//! - Builder pattern for events, announcements and the client itself
//! - Bring your own `reqwest-middleware` client, or use the shared default
//!
//! ## Example
//!
//! ```rust,no_run
//! use shout_client::{AnnouncementIn, EventIn, ShoutClient, TopicState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ShoutClient::new("http://localhost:8080")?;
//!
//!     let event = EventIn::working("nightly-backup")
//!         .with_message("backup finished")
//!         .with_link("https://ci.example.com/jobs/43");
//!
//!     let state = client.post_event(&event).await?;
//!     if state.state == TopicState::Fixed {
//!         println!("{} recovered", state.name);
//!     }
//!
//!     client
//!         .post_announcement(&AnnouncementIn::new("deploys", "v2.1 is live"))
//!         .await?;
//!     Ok(())
//! }
//! ```

mod client;
mod errors;
mod types;

pub use client::{default_transport, ShoutClient, ShoutClientBuilder, DEFAULT_MAX_REDIRECTS};
pub use errors::{ErrorKind, Result, ShoutError};
pub use types::{parse_state, AnnouncementIn, EventIn, EventOut, StateOut, TopicState};
