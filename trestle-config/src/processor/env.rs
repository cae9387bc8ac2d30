use std::env;

use trestle_core::err::{bail, Result};
use trestle_logging::trace;

use crate::ctx::Ctx;

use super::{
    util::match_interpolation, ConfigExprProcessor, ConfigExprResult, ConfigStringExpr as X,
};

/// Interpolates configuration using environment variables
///
/// `${env:NAME}` fails when the variable is unset, `${env:NAME:default}`
/// falls back to the default.
#[derive(Default)]
pub struct EnvConfigProcessor {}

impl ConfigExprProcessor for EnvConfigProcessor {
    fn display_name(&self) -> &str {
        "environment"
    }

    fn process(&self, _ctx: &Ctx, expr: X) -> Result<ConfigExprResult> {
        let parts = match match_interpolation(&expr, &["env"]) {
            Some(parts) => parts,
            None => return Ok(ConfigExprResult::Expr(expr)),
        };

        let (name, default) = match parts.as_slice() {
            [name] => (name, None),
            [name, default] => (name, Some(default)),
            _ => bail!("Invalid env expression, expected ${{env:NAME}} or ${{env:NAME:default}}"),
        };

        let value = match (env::var(name), default) {
            (Ok(value), _) => value,
            (Err(_), Some(default)) => default.clone(),
            (Err(_), None) => bail!("Environment variable {} is not set", name),
        };

        trace!("Replaced env expression {} with '{}'", name, value);
        Ok(ConfigExprResult::Expr(X::Constant(value)))
    }
}
