//! Database properties the harness sets on the engine

/// Enables the sql authorization checks when set to "true"
pub const SQL_AUTHORIZATION: &str = "derby.database.sqlAuthorization";
/// Enables authentication of connecting users when set to "true"
pub const REQUIRE_AUTHENTICATION: &str = "derby.connection.requireAuthentication";
/// The authentication provider, eg "BUILTIN"
pub const AUTHENTICATION_PROVIDER: &str = "derby.authentication.provider";
/// Prefix of the builtin user definitions, `derby.user.<name>=<password>`
pub const USER_PREFIX: &str = "derby.user.";

/// The property defining the password of a builtin user
pub fn user_property(user: &str) -> String {
    format!("{}{}", USER_PREFIX, user)
}
