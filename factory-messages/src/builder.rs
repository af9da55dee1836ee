/// Renders a `{variable}` template in a single pass.
///
/// Substituted values are never scanned again, so a value that itself
/// contains braces (a YAML snippet, a provider error) comes out verbatim.
/// Placeholders without a value are left untouched and show up in the
/// rendered text.
pub struct MessageBuilder {
    template: &'static str,
    vars: Vec<(&'static str, String)>,
}

impl MessageBuilder {
    pub fn new(template: &'static str) -> Self {
        Self {
            template,
            vars: Vec::new(),
        }
    }

    /// Set `key`. A later value for the same key wins.
    pub fn var(mut self, key: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.vars.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.vars.push((key, value)),
        }
        self
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn build(self) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}');
            let key = close.map(|close| &after[..close]);
            match (key, close) {
                (Some(key), Some(close)) if is_placeholder(key) => {
                    match self.lookup(key) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push('{');
                            out.push_str(key);
                            out.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                _ => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

fn is_placeholder(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_substitutes_every_occurrence() {
        let text = MessageBuilder::new("{name} and {name} in {namespace}")
            .var("name", "wksp")
            .var("namespace", "user-che")
            .build();
        assert_eq!(text, "wksp and wksp in user-che");
    }

    #[test]
    fn test_build_keeps_unknown_placeholders() {
        let text = MessageBuilder::new("waited {timeout} seconds").build();
        assert_eq!(text, "waited {timeout} seconds");
    }

    #[test]
    fn test_values_are_not_rendered_again() {
        let text = MessageBuilder::new("❌ Failed: {error} ({url})")
            .var("error", "unexpected key {url} in devfile")
            .var("url", "https://github.com/org/repo")
            .build();
        assert_eq!(
            text,
            "❌ Failed: unexpected key {url} in devfile (https://github.com/org/repo)"
        );
    }

    #[test]
    fn test_stray_braces_pass_through() {
        let text = MessageBuilder::new("{ not a var } {} {name")
            .var("name", "x")
            .build();
        assert_eq!(text, "{ not a var } {} {name");
    }

    #[test]
    fn test_last_value_wins() {
        let text = MessageBuilder::new("{name}")
            .var("name", "first")
            .var("name", "second")
            .build();
        assert_eq!(text, "second");
    }
}
