use trestle_core::err::Result;

use crate::ctx::Ctx;

pub(crate) mod dir;
pub(crate) mod env;
pub(crate) mod util;

/// A config processor resolves `${...}` expressions found in config strings
pub(crate) trait ConfigExprProcessor {
    /// Gets the human readable display name for the processor
    fn display_name(&self) -> &str;

    /// Resolves the expression if it is understood by this processor,
    /// otherwise returns it unchanged
    fn process(&self, ctx: &Ctx, expr: ConfigStringExpr) -> Result<ConfigExprResult>;
}

/// AST used to represent configuration expressions
#[derive(Debug, PartialEq, Clone)]
pub(crate) enum ConfigStringExpr {
    Constant(String),
    Concat(Vec<ConfigStringExpr>),
    /// Represents an interpolated value used in the configuration
    /// Format ${[part 1]:[part 2]..:[part n]}
    /// For instance, ${env:SOME_VAR}
    Interpolation(Vec<ConfigStringExpr>),
}

/// The output of a processor
#[derive(Debug, PartialEq, Clone)]
pub(crate) enum ConfigExprResult {
    Expr(ConfigStringExpr),
    Yaml(serde_yaml::Value),
}
