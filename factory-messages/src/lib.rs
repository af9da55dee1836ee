//! factory-messages
//!
//! User-facing texts for the factory loader.
//! Provides the message templates, a template builder and the `msg!` macro
//! used to render step titles, alert titles and error descriptions.

pub mod builder;
pub mod macros;
pub mod messages;

pub use builder::MessageBuilder;
pub use messages::{Messages, MESSAGES};
