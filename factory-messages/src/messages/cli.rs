//! Output of the `factory-loader` binary

pub struct CliMessages {
    pub alert_action: &'static str,
    pub alert_header: &'static str,
    pub id_factory: &'static str,
    pub id_policy: &'static str,
    pub id_source_kind: &'static str,
    pub id_storage: &'static str,
    pub outcome_auth: &'static str,
    pub outcome_cancelled: &'static str,
    pub outcome_conflict: &'static str,
    pub outcome_failed: &'static str,
    pub outcome_success: &'static str,
    pub step_line: &'static str,
}

pub const CLI_MESSAGES: CliMessages = CliMessages {
    alert_action: "  • {action}",
    alert_header: "[{severity}] {title}\n{body}",
    id_factory: "factory id:  {id}",
    id_policy: "policy:      {policy}",
    id_source_kind: "source kind: {kind}",
    id_storage: "storage:     {storage}",
    outcome_auth: "🔐 Redirected to {url} for authentication",
    outcome_cancelled: "🛑 Cancelled",
    outcome_conflict: "⚠️  Paused: an existing workspace '{name}' matches this factory",
    outcome_failed: "❌ Failed: {error}",
    outcome_success: "✅ Workspace ready: {namespace}/{name}",
    step_line: "{marker} {title}",
};
