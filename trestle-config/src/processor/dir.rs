use std::path::Path;

use trestle_core::err::Result;
use trestle_logging::trace;

use crate::ctx::Ctx;

use super::{
    util::match_interpolation, ConfigExprProcessor, ConfigExprResult, ConfigStringExpr as X,
};

/// Expands `${dir}` to the directory holding the config file being loaded.
///
/// Only the bare form is recognised, `${dir:...}` is left as written.
#[derive(Default)]
pub struct DirConfigProcessor {}

impl DirConfigProcessor {
    fn config_dir<'a>(ctx: &'a Ctx<'_>) -> Option<&'a Path> {
        ctx.path.as_deref().and_then(Path::parent)
    }
}

impl ConfigExprProcessor for DirConfigProcessor {
    fn display_name(&self) -> &str {
        "current_dir"
    }

    fn process(&self, ctx: &Ctx, expr: X) -> Result<ConfigExprResult> {
        let is_bare_dir = match_interpolation(&expr, &["dir"]).map_or(false, |rest| rest.is_empty());

        let expr = match Self::config_dir(ctx) {
            Some(dir) if is_bare_dir => {
                let replacement = dir.to_string_lossy().to_string();
                trace!("Replaced dir expression with '{}'", replacement);
                X::Constant(replacement)
            }
            _ => expr,
        };

        Ok(ConfigExprResult::Expr(expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_for(path: &str) -> Ctx {
        let mut ctx = Ctx::mock();
        ctx.path = Some(path.into());
        ctx
    }

    fn interpolation(parts: &[&str]) -> X {
        X::Interpolation(parts.iter().map(|p| X::Constant(p.to_string())).collect())
    }

    #[test]
    fn test_dir_processor_ignores_unknown_prefix() {
        let ctx = ctx_for("/a/b/c.yml");
        let processor = DirConfigProcessor::default();

        let input = interpolation(&["test"]);
        let result = processor.process(&ctx, input.clone());

        assert_eq!(result.unwrap(), ConfigExprResult::Expr(input));
    }

    #[test]
    fn test_dir_processor_replaces_dir_expr() {
        let ctx = ctx_for("/a/b/c.yml");
        let processor = DirConfigProcessor::default();

        let result = processor.process(&ctx, interpolation(&["dir"]));

        assert_eq!(
            result.unwrap(),
            ConfigExprResult::Expr(X::Constant("/a/b".to_string()))
        );
    }

    #[test]
    fn test_dir_processor_leaves_dir_with_suffix_unexpanded() {
        let ctx = ctx_for("/a/b/c.yml");
        let processor = DirConfigProcessor::default();

        let input = interpolation(&["dir", "x"]);
        let result = processor.process(&ctx, input.clone());

        assert_eq!(result.unwrap(), ConfigExprResult::Expr(input));
    }

    #[test]
    fn test_dir_processor_leaves_dir_with_suffix_unexpanded_after_parsing() {
        let ctx = ctx_for("/a/b/c.yml");
        let processor = DirConfigProcessor::default();

        let input = crate::processor::util::parse_expression("${dir:x}").unwrap();
        let result = processor.process(&ctx, input.clone());

        assert_eq!(result.unwrap(), ConfigExprResult::Expr(input));
    }

    #[test]
    fn test_dir_processor_ignores_when_no_present_dir() {
        let ctx = Ctx::mock();
        let processor = DirConfigProcessor::default();

        let input = interpolation(&["dir"]);
        let result = processor.process(&ctx, input.clone());

        assert_eq!(result.unwrap(), ConfigExprResult::Expr(input));
    }
}
