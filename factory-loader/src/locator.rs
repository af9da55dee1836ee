//! Finding workspaces a factory link already produced.

use crate::params::CreatePolicy;
use crate::workspace::Workspace;

/// Find the workspace that satisfies the factory link under `policy`.
///
/// With `PerUser` any workspace stamped with `factory_id` matches. With
/// `PerClick` the name must match `candidate_name` as well, and without a
/// candidate nothing matches. Workspaces without readable provenance never
/// match.
pub fn locate<'a>(
    workspaces: &'a [Workspace],
    factory_id: &str,
    policy: CreatePolicy,
    candidate_name: Option<&str>,
) -> Option<&'a Workspace> {
    workspaces.iter().find(|workspace| {
        let factory_match = workspace.factory_params().as_deref() == Some(factory_id);
        match policy {
            CreatePolicy::PerUser => factory_match,
            CreatePolicy::PerClick => {
                factory_match && candidate_name.is_some_and(|name| workspace.name == name)
            }
        }
    })
}

/// The workspace stamped with `factory_id` and called `name`, whatever the
/// policy. With a `namespace` only workspaces there count.
pub fn locate_named<'a>(
    workspaces: &'a [Workspace],
    namespace: Option<&str>,
    factory_id: &str,
    name: &str,
) -> Option<&'a Workspace> {
    workspaces.iter().find(|workspace| {
        namespace.map_or(true, |ns| workspace.namespace == ns)
            && workspace.name == name
            && workspace.factory_params().as_deref() == Some(factory_id)
    })
}

pub fn find_by_name<'a>(workspaces: &'a [Workspace], name: &str) -> Option<&'a Workspace> {
    workspaces.iter().find(|workspace| workspace.name == name)
}

pub fn has_name_conflict(workspaces: &[Workspace], name: &str) -> bool {
    find_by_name(workspaces, name).is_some()
}
