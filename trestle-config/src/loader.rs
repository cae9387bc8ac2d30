use std::{
    any::type_name,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_yaml::Deserializer;
use trestle_core::{
    config::HarnessConfig,
    err::{Context, Result},
};
use trestle_logging::{debug, info};

use crate::{
    ctx::Ctx,
    processor::{
        dir::DirConfigProcessor,
        env::EnvConfigProcessor,
        util::{expression_to_string, parse_expression, process_expression, process_strings},
        ConfigExprProcessor, ConfigExprResult,
    },
};

/// Parses and loads the harness configuration
pub struct ConfigLoader {
    processors: Vec<Box<dyn ConfigExprProcessor>>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Initialises the configuration loader
    pub fn new() -> Self {
        Self {
            processors: Self::default_processors(),
        }
    }

    #[cfg(test)]
    pub(crate) fn mock() -> Self {
        Self { processors: vec![] }
    }

    fn default_processors() -> Vec<Box<dyn ConfigExprProcessor>> {
        vec![
            Box::new(EnvConfigProcessor::default()),
            Box::new(DirConfigProcessor::default()),
        ]
    }

    /// Loads the harness configuration from the supplied file
    pub fn load(&self, path: &Path) -> Result<HarnessConfig> {
        let path = path
            .canonicalize()
            .context("Failed to get full config path")?;
        info!("Loading config from path {}", path.display());

        let processed = self.load_yaml(path.as_path())?;
        Self::parse(processed)
    }

    /// Loads the harness configuration from an in-memory yaml document
    pub fn load_str(&self, yaml: &str) -> Result<HarnessConfig> {
        let processed = self.load_data(yaml.as_bytes(), None)?;
        Self::parse(processed)
    }

    fn parse(processed: serde_yaml::Value) -> Result<HarnessConfig> {
        debug!("Parsing into {}", type_name::<HarnessConfig>());
        // an empty document means "all defaults"
        let processed = match processed {
            serde_yaml::Value::Null => serde_yaml::Value::Mapping(Default::default()),
            other => other,
        };

        serde_yaml::from_value(processed).context("Failed to parse yaml into HarnessConfig")
    }

    /// Loads processed yaml from the supplied file
    pub(crate) fn load_yaml(&self, path: &Path) -> Result<serde_yaml::Value> {
        debug!("Loading yaml from file {}", path.display());

        let file_data = fs::read(path)
            .with_context(|| format!("Failed to read config from file {}", path.display()))?;

        self.load_data(file_data.as_slice(), Some(path.to_path_buf()))
    }

    /// Parses and processes the supplied yaml
    pub(crate) fn load_data(&self, data: &[u8], path: Option<PathBuf>) -> Result<serde_yaml::Value> {
        let config = serde_yaml::Value::deserialize(Deserializer::from_slice(data))
            .context("Failed to parse yaml")?;

        let ctx = Ctx::new(self, path);
        let config = process_strings(config, &|string| {
            let exp = parse_expression(string.as_str())?;

            let res = process_expression(exp, &|mut exp| {
                for processor in ctx.loader.processors.iter() {
                    let res = processor.process(&ctx, exp).with_context(|| {
                        format!(
                            "Failed to process config value \"{}\" using the {} processor",
                            string,
                            processor.display_name()
                        )
                    })?;

                    exp = match res {
                        ConfigExprResult::Expr(exp) => exp,
                        yaml @ ConfigExprResult::Yaml(_) => return Ok(yaml),
                    }
                }

                Ok(ConfigExprResult::Expr(exp))
            })?;

            Ok(match res {
                ConfigExprResult::Expr(exp) => serde_yaml::Value::String(expression_to_string(exp)),
                ConfigExprResult::Yaml(node) => node,
            })
        })?;

        debug!("Finished processing yaml");
        Ok(config)
    }
}
