//! Tracing subscriber setup for the factory loader binaries.
//!
//! Everything is driven by environment variables:
//!
//! | variable | values | default |
//! |---|---|---|
//! | `LOG_LEVEL` | any `EnvFilter` directive | `info` |
//! | `LOG_FORMAT` | `human`, `json` | `human` |
//! | `LOG_OUTPUT` | `console`, `file`, `both`, `none` | `console` |
//! | `LOG_FILE_PATH` | path of the rolling log file | `/tmp/factory-loader.log` |
//! | `LOG_TAGS` | `key:value,...` span field filters, `*` matches any value | empty |
//!
//! `RUST_LOG` takes precedence over `LOG_LEVEL` when set.

use std::{
    collections::HashMap,
    env,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{field::Visit, span, Metadata, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::MakeWriter,
    layer::{Context, Layer},
    prelude::*,
    registry,
    registry::LookupSpan,
    EnvFilter,
};

const DEFAULT_LOG_FILE: &str = "/tmp/factory-loader.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Console,
    File,
    Both,
    None,
}

/// A `key:value` span field filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    pub file_path: PathBuf,
    pub tags: Vec<Tag>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Human,
            output: LogOutput::Console,
            file_path: PathBuf::from(DEFAULT_LOG_FILE),
            tags: Vec::new(),
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Human,
        };
        let output = match env::var("LOG_OUTPUT").as_deref() {
            Ok("file") => LogOutput::File,
            Ok("both") => LogOutput::Both,
            Ok("none") => LogOutput::None,
            _ => LogOutput::Console,
        };

        Self {
            level: env::var("LOG_LEVEL").unwrap_or(defaults.level),
            format,
            output,
            file_path: env::var("LOG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.file_path),
            tags: env::var("LOG_TAGS")
                .map(|raw| parse_tags(&raw))
                .unwrap_or_default(),
        }
    }
}

/// Parse `key:value` pairs separated by commas. Malformed entries are skipped.
pub fn parse_tags(raw: &str) -> Vec<Tag> {
    raw.split(',')
        .filter_map(|s| {
            let (key, value) = s.split_once(':')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some(Tag {
                key: key.to_string(),
                value: value.trim().to_string(),
            })
        })
        .collect()
}

// --- Console + file writer ---
struct Tee<A, B> {
    a: A,
    b: B,
}

impl<A, B> Write for Tee<A, B>
where
    A: Write,
    B: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let res_a = self.a.write(buf);
        let res_b = self.b.write(buf);
        res_a.or(res_b)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.a.flush()?;
        self.b.flush()
    }
}

#[derive(Clone)]
struct MakeTee<A, B> {
    make_a: A,
    make_b: B,
}

impl<'a, A, B, W1, W2> MakeWriter<'a> for MakeTee<A, B>
where
    A: MakeWriter<'a, Writer = W1>,
    B: MakeWriter<'a, Writer = W2>,
    W1: Write + 'a,
    W2: Write + 'a,
{
    type Writer = Tee<W1, W2>;
    fn make_writer(&'a self) -> Self::Writer {
        Tee {
            a: self.make_a.make_writer(),
            b: self.make_b.make_writer(),
        }
    }
}

// --- Span field filtering ---
struct TagFilterLayer {
    filters: Vec<Tag>,
}

impl TagFilterLayer {
    fn matches(&self, fields: &HashMap<String, String>) -> bool {
        self.filters.iter().all(|filter| {
            fields
                .get(&filter.key)
                .is_some_and(|value| filter.value == "*" || value.contains(&filter.value))
        })
    }
}

impl<S> Layer<S> for TagFilterLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = HashMap::new();
        attrs.record(&mut FieldVisitor(&mut fields));
        span.extensions_mut().insert(fields);
    }

    fn enabled(&self, _meta: &Metadata<'_>, ctx: Context<'_, S>) -> bool {
        if self.filters.is_empty() {
            return true;
        }

        // With tags configured, events outside any span are dropped.
        let Some(scope) = ctx.current_span().id().and_then(|id| ctx.span_scope(id)) else {
            return false;
        };

        let mut all_fields = HashMap::new();
        for span_ref in scope {
            if let Some(fields) = span_ref.extensions().get::<HashMap<String, String>>() {
                for (k, v) in fields {
                    all_fields.entry(k.clone()).or_insert_with(|| v.clone());
                }
            }
        }

        self.matches(&all_fields)
    }
}

struct FieldVisitor<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), format!("{value:?}"));
    }
}

fn fmt_layer<S, W>(writer: W, format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer().with_writer(writer);
    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Human => layer.pretty().boxed(),
    }
}

/// Initializes the global tracing subscriber from the environment.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for the lifetime of the program.
pub fn init_subscriber() -> Option<WorkerGuard> {
    init_with(LoggingConfig::from_env())
}

pub fn init_with(config: LoggingConfig) -> Option<WorkerGuard> {
    let mut env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    for directive in ["tokio=warn", "hyper=warn"] {
        if let Ok(directive) = directive.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    let tag_filter_layer = TagFilterLayer {
        filters: config.tags.clone(),
    };

    let log_dir = config
        .file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("/tmp"))
        .to_path_buf();
    let log_filename = config
        .file_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "factory-loader.log".into());

    let mut guard = None;
    let output_layer = match config.output {
        LogOutput::Console => Some(fmt_layer(std::io::stdout, config.format)),
        LogOutput::File => {
            let file_appender = tracing_appender::rolling::daily(&log_dir, &log_filename);
            let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
            guard = Some(file_guard);
            Some(fmt_layer(non_blocking, config.format))
        }
        LogOutput::Both => {
            let file_appender = tracing_appender::rolling::daily(&log_dir, &log_filename);
            let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
            guard = Some(file_guard);
            let tee_writer = MakeTee {
                make_a: std::io::stdout,
                make_b: non_blocking,
            };
            Some(fmt_layer(tee_writer, config.format))
        }
        LogOutput::None => None,
    };

    registry()
        .with(env_filter)
        .with(tag_filter_layer)
        .with(output_layer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_tags_skips_malformed_entries() {
        let tags = parse_tags("step:apply, broken ,:empty,factory_id:*");
        assert_eq!(
            tags,
            vec![
                Tag {
                    key: "step".to_string(),
                    value: "apply".to_string()
                },
                Tag {
                    key: "factory_id".to_string(),
                    value: "*".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_tag_filter_requires_every_tag() {
        let layer = TagFilterLayer {
            filters: parse_tags("step:apply,factory_id:*"),
        };

        let mut fields = HashMap::new();
        fields.insert("step".to_string(), "apply".to_string());
        assert!(!layer.matches(&fields));

        fields.insert("factory_id".to_string(), "url=https://x".to_string());
        assert!(layer.matches(&fields));
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        env::set_var("LOG_FORMAT", "json");
        env::set_var("LOG_OUTPUT", "both");
        env::set_var("LOG_TAGS", "step:resolve");
        env::remove_var("LOG_LEVEL");
        env::remove_var("LOG_FILE_PATH");

        let config = LoggingConfig::from_env();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, LogOutput::Both);
        assert_eq!(config.level, "info");
        assert_eq!(config.file_path, PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(config.tags.len(), 1);

        env::remove_var("LOG_FORMAT");
        env::remove_var("LOG_OUTPUT");
        env::remove_var("LOG_TAGS");
    }

    #[test]
    #[serial]
    fn test_config_defaults_on_unknown_values() {
        env::set_var("LOG_FORMAT", "xml");
        env::set_var("LOG_OUTPUT", "syslog");

        let config = LoggingConfig::from_env();
        assert_eq!(config.format, LogFormat::Human);
        assert_eq!(config.output, LogOutput::Console);

        env::remove_var("LOG_FORMAT");
        env::remove_var("LOG_OUTPUT");
    }
}
