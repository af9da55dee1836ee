//! Central registry for all user-facing message templates.
//!
//! Organized by domain:
//! - `steps` - loader step titles
//! - `alerts` - alert titles and action labels
//! - `errors` - error descriptions shown in alert bodies
//! - `cli` - output of the `factory-loader` binary
//!
//! Templates use `{variable}` syntax for runtime values, which are
//! substituted by the `MessageBuilder`:
//!
//! ```rust
//! use factory_messages::{msg, MESSAGES};
//!
//! let title = msg!(MESSAGES.steps.resolve_devfile, url = "https://github.com/eclipse-che/che-dashboard");
//! assert_eq!(title, "Inspecting repo https://github.com/eclipse-che/che-dashboard for a devfile");
//! ```

mod alerts;
mod cli;
mod errors;
mod steps;

pub use alerts::{AlertMessages, ALERT_MESSAGES};
pub use cli::{CliMessages, CLI_MESSAGES};
pub use errors::{ErrorMessages, ERROR_MESSAGES};
pub use steps::{StepMessages, STEP_MESSAGES};

/// Unified messages struct containing all domain-specific message modules
pub struct Messages {
    pub steps: StepMessages,
    pub alerts: AlertMessages,
    pub errors: ErrorMessages,
    pub cli: CliMessages,
}

/// Global messages constant - main entry point for all message templates
pub const MESSAGES: Messages = Messages {
    steps: STEP_MESSAGES,
    alerts: ALERT_MESSAGES,
    errors: ERROR_MESSAGES,
    cli: CLI_MESSAGES,
};
