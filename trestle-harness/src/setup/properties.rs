use std::env;

use trestle_connectors_base::{
    common::property::{user_property, AUTHENTICATION_PROVIDER, REQUIRE_AUTHENTICATION},
    interface::Connection,
};
use trestle_core::{
    config::Change,
    err::{Context, Result},
};
use trestle_logging::debug;

use super::{Properties, Saved};
use crate::{decorator::Decorator, node::Node};

/// How a [`database_property_decorator_with_options`] applies its properties
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PropertyOptions {
    /// Restore the previous values once the subtree has run
    pub teardown: bool,
    /// The properties only take effect on boot, so the database is shut
    /// down after they are changed
    pub static_properties: bool,
}

impl Default for PropertyOptions {
    fn default() -> Self {
        Self {
            teardown: true,
            static_properties: false,
        }
    }
}

/// Sets database properties for the subtree and restores them afterwards
pub fn database_property_decorator(node: impl Into<Node>, props: Properties) -> Node {
    database_property_decorator_with_options(node, props, PropertyOptions::default())
}

/// Sets database properties for the subtree and leaves them in place
pub fn database_property_decorator_no_teardown(node: impl Into<Node>, props: Properties) -> Node {
    database_property_decorator_with_options(
        node,
        props,
        PropertyOptions {
            teardown: false,
            ..PropertyOptions::default()
        },
    )
}

pub fn database_property_decorator_with_options(
    node: impl Into<Node>,
    props: Properties,
    options: PropertyOptions,
) -> Node {
    let name = format!("database_properties[{}]", props.keys().cloned().collect::<Vec<_>>().join(","));
    let saved = Saved::<Vec<(String, Option<String>)>>::default();
    let restore = saved.clone();

    let decorator = Decorator::new(name, node).before(move |ctx| {
        let mut con = ctx.open_default_connection()?;
        let mut previous = vec![];

        // whatever was applied before a failure is still restored by `after`
        let applied = set_properties(con.as_mut(), &props, &mut previous);
        saved.capture(|| previous);
        applied?;
        drop(con);

        if options.static_properties {
            ctx.shutdown_database()?;
        }

        Ok(())
    });

    if !options.teardown {
        return decorator.into();
    }

    decorator
        .after(move |ctx| {
            let previous = match restore.take() {
                Some(previous) => previous,
                None => return Ok(()),
            };

            let mut con = ctx.open_default_connection()?;
            for (key, old) in previous.iter().rev() {
                debug!("Restoring database property {}={:?}", key, old);
                con.set_database_property(key, old.as_deref())
                    .with_context(|| format!("Failed to restore database property {}", key))?;
            }
            drop(con);

            if options.static_properties {
                ctx.shutdown_database()?;
            }

            Ok(())
        })
        .into()
}

fn set_properties(
    con: &mut dyn Connection,
    props: &Properties,
    previous: &mut Vec<(String, Option<String>)>,
) -> Result<()> {
    for (key, value) in props.iter() {
        let old = con
            .get_database_property(key)
            .with_context(|| format!("Failed to read database property {}", key))?;
        debug!("Setting database property {}={} (was {:?})", key, value, old);
        con.set_database_property(key, Some(value))
            .with_context(|| format!("Failed to set database property {}", key))?;
        previous.push((key.clone(), old));
    }

    Ok(())
}

/// Enables builtin authentication for the supplied users.
///
/// Each user's password is its name followed by `token`. The subtree runs
/// as the first user, who also removes the properties on the way out.
pub fn builtin_authentication(node: impl Into<Node>, users: &[&str], token: &str) -> Node {
    let mut props = Properties::new();
    props.insert(REQUIRE_AUTHENTICATION.into(), "true".into());
    props.insert(AUTHENTICATION_PROVIDER.into(), "BUILTIN".into());
    for user in users {
        props.insert(user_property(user), format!("{}{}", user, token));
    }

    let node = database_property_decorator_with_options(
        node,
        props,
        PropertyOptions {
            teardown: true,
            static_properties: true,
        },
    );

    let first = users.first().copied().unwrap_or_default();
    Decorator::new("builtin_authentication", node)
        .change(Change::Credentials {
            user: first.into(),
            password: format!("{}{}", first, token),
            password_token: Some(token.into()),
        })
        .into()
}

/// Sets process environment variables for the subtree and restores them
pub fn system_property_decorator(node: impl Into<Node>, vars: Properties) -> Node {
    let name = format!("system_properties[{}]", vars.keys().cloned().collect::<Vec<_>>().join(","));
    let saved = Saved::<Vec<(String, Option<String>)>>::default();
    let restore = saved.clone();

    Decorator::new(name, node)
        .before(move |_| {
            let previous = vars
                .keys()
                .map(|k| (k.clone(), env::var(k).ok()))
                .collect::<Vec<_>>();
            saved.capture(|| previous);

            for (key, value) in vars.iter() {
                debug!("Setting environment variable {}={}", key, value);
                env::set_var(key, value);
            }

            Ok(())
        })
        .after(move |_| {
            for (key, old) in restore.take().unwrap_or_default().into_iter().rev() {
                match old {
                    Some(old) => env::set_var(&key, old),
                    None => env::remove_var(&key),
                }
            }

            Ok(())
        })
        .into()
}
