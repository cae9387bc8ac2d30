use trestle_connectors_base::interface::Policy;
use trestle_core::err::{Context, Result};
use trestle_logging::debug;

use super::Saved;
use crate::{context::TestContext, decorator::Decorator, node::Node};

/// Installs the policy for the subtree, reinstating whatever was
/// installed before once it completes
pub fn security_policy_decorator(node: impl Into<Node>, policy: Policy) -> Node {
    let name = format!("security_policy:{}", policy.name);

    policy_decorator(name, node, Some(policy))
}

/// Runs the subtree without any security policy installed
pub fn no_security_policy(node: impl Into<Node>) -> Node {
    policy_decorator("no_security_policy".into(), node, None)
}

fn policy_decorator(name: String, node: impl Into<Node>, policy: Option<Policy>) -> Node {
    let saved = Saved::<Option<Policy>>::default();
    let restore = saved.clone();

    Decorator::new(name, node)
        .before(move |ctx| {
            let installer = ctx.policy_installer();
            saved.capture(|| installer.installed());

            match &policy {
                Some(policy) => {
                    debug!("Installing security policy {}", policy.name);
                    installer
                        .install(policy)
                        .with_context(|| format!("Failed to install security policy {}", policy.name))
                }
                None => installer.uninstall().context("Failed to remove security policy"),
            }
        })
        .after(move |ctx| match restore.take() {
            Some(previous) => reinstate(ctx, previous),
            None => Ok(()),
        })
        .into()
}

fn reinstate(ctx: &TestContext, previous: Option<Policy>) -> Result<()> {
    let installer = ctx.policy_installer();

    match previous {
        Some(policy) => {
            debug!("Reinstating security policy {}", policy.name);
            installer.install(&policy)
        }
        None => installer.uninstall(),
    }
    .context("Failed to restore security policy")
}
