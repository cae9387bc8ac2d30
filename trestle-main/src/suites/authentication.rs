use trestle_connectors_base::common::state;
use trestle_core::err::{bail, ensure, Context, Result};
use trestle_harness::{
    assert::assert_sql_state,
    node::Node,
    setup::{builtin_authentication, single_use_database_decorator},
    suites::default_suite,
    Environment, Fixture, Suite,
};

/// Address of a directory server, as `host:port`
pub const LDAP_SERVER_VAR: &str = "TRESTLE_LDAP_SERVER";

const USERS: [&str; 3] = ["DAN", "BOB", "KATIE"];
const TOKEN: &str = "pw";

pub fn suite(env: &Environment) -> Result<Node> {
    let fixtures = Suite::new("fixtures")
        .add(Fixture::new("first_user_is_default", |ctx| {
            let con = ctx.open_default_connection()?;

            ensure!(con.user() == "DAN", "Connected as {} rather than DAN", con.user());
            Ok(())
        }))
        .add(Fixture::new("every_user_connects", |ctx| {
            for user in USERS {
                ctx.open_connection_as(user, &ctx.configuration().password_for(user))?;
            }
            Ok(())
        }))
        .add(Fixture::new("wrong_password_rejected", |ctx| {
            assert_sql_state(
                state::INVALID_AUTHORIZATION,
                ctx.open_connection_as("BOB", "DANpw").map(|_| ()),
            )
        }))
        .add(Fixture::new("unknown_user_rejected", |ctx| {
            assert_sql_state(
                state::INVALID_AUTHORIZATION,
                ctx.open_connection_as("MALLORY", "MALLORYpw").map(|_| ()),
            )
        }));

    let suite = Suite::new("authentication")
        .add(default_suite(
            env,
            "builtin",
            single_use_database_decorator(builtin_authentication(fixtures, &USERS, TOKEN)),
        ))
        .add_when(env.require_var(LDAP_SERVER_VAR), ldap_server(env));

    Ok(suite.into())
}

fn ldap_server(env: &Environment) -> Fixture {
    let server = env.var(LDAP_SERVER_VAR).unwrap_or_default().to_string();

    Fixture::new("ldap_server_address", move |_| {
        let (host, port) = match server.rsplit_once(':') {
            Some(parts) => parts,
            None => bail!("{} must be of the form host:port, got {}", LDAP_SERVER_VAR, server),
        };

        ensure!(!host.is_empty(), "{} has an empty host", LDAP_SERVER_VAR);
        port.parse::<u16>()
            .with_context(|| format!("{} has an invalid port", LDAP_SERVER_VAR))?;
        Ok(())
    })
}
