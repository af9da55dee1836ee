/// Render a message template with named variables.
///
/// ```
/// use factory_messages::{msg, MESSAGES};
///
/// let text = msg!(MESSAGES.errors.creation_timeout, timeout = "20");
/// assert!(text.contains("20 seconds"));
/// ```
///
/// A trailing `key` without a value takes a variable of the same name:
///
/// ```
/// use factory_messages::{msg, MESSAGES};
///
/// let name = "new-project";
/// let text = msg!(MESSAGES.cli.outcome_conflict, name);
/// assert!(text.contains("'new-project'"));
/// ```
#[macro_export]
macro_rules! msg {
    (@value $key:ident, $value:expr) => {
        $value
    };
    (@value $key:ident) => {
        $key
    };
    ($template:expr $(, $key:ident $(= $value:expr)?)* $(,)?) => {
        $crate::builder::MessageBuilder::new($template)
            $(.var(stringify!($key), $crate::msg!(@value $key $(, $value)?)))*
            .build()
    };
}
