use super::LogError;
use log::LevelFilter;
use log4rs::config::Logger;
use std::{collections::BTreeMap, env, str::FromStr};

/// Logging filters parsed from an expression such as `"info,kchain_consensus=trace"`.
///
/// A bare level sets the root level, `name=level` sets the level of the named module
/// path and a bare `name` enables everything for that path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    root_level: Option<LevelFilter>,
    modules: BTreeMap<String, LevelFilter>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extends the filters with the expression held by the `env` variable, if set
    pub fn parse_env(&mut self, env: &str) -> Result<&mut Self, LogError> {
        match env::var(env) {
            Ok(expression) => self.parse_expression(&expression),
            Err(_) => Ok(self),
        }
    }

    pub fn parse_expression(&mut self, expression: &str) -> Result<&mut Self, LogError> {
        for spec in expression.split(',').map(str::trim).filter(|spec| !spec.is_empty()) {
            let mut parts = spec.split('=').map(str::trim);
            match (parts.next(), parts.next(), parts.next()) {
                (Some(part0), None, None) => match part0.parse() {
                    Ok(level) => self.root_level = Some(level),
                    Err(_) => {
                        self.modules.insert(part0.to_string(), LevelFilter::max());
                    }
                },
                (Some(name), Some(level), None) if !name.is_empty() => {
                    let level = if level.is_empty() {
                        LevelFilter::max()
                    } else {
                        level.parse().map_err(|_| LogError::ParseLoggerSpecError(spec.to_string()))?
                    };
                    self.modules.insert(name.to_string(), level);
                }
                _ => return Err(LogError::ParseLoggerSpecError(spec.to_string())),
            }
        }
        Ok(self)
    }

    /// Root level, `Info` unless the expression said otherwise
    pub fn root_level(&self) -> LevelFilter {
        self.root_level.unwrap_or(LevelFilter::Info)
    }

    pub fn module_level(&self, name: &str) -> Option<LevelFilter> {
        self.modules.get(name).copied()
    }

    pub(super) fn loggers(&self, appenders: &[&'static str]) -> Vec<Logger> {
        self.modules
            .iter()
            .map(|(name, level)| Logger::builder().appenders(appenders.iter().copied()).additive(false).build(name.clone(), *level))
            .collect()
    }
}

impl FromStr for Filters {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut filters = Self::new();
        filters.parse_expression(s)?;
        Ok(filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filters() {
        let filters: Filters = "warn, kchain_consensus=trace ,kchaind=".parse().unwrap();
        assert_eq!(filters.root_level(), LevelFilter::Warn);
        assert_eq!(filters.module_level("kchain_consensus"), Some(LevelFilter::Trace));
        assert_eq!(filters.module_level("kchaind"), Some(LevelFilter::Trace));
        assert_eq!(filters.module_level("other"), None);
        assert_eq!(filters.loggers(&["stderr"]).len(), 2);
    }

    #[test]
    fn test_default_and_bare_module() {
        let filters: Filters = "kchain_core".parse().unwrap();
        assert_eq!(filters.root_level(), LevelFilter::Info);
        assert_eq!(filters.module_level("kchain_core"), Some(LevelFilter::Trace));
        assert_eq!("".parse::<Filters>().unwrap(), Filters::new());
    }

    #[test]
    fn test_invalid_filters() {
        assert!(matches!("info,a=loud".parse::<Filters>(), Err(LogError::ParseLoggerSpecError(spec)) if spec == "a=loud"));
        assert!("a=b=c".parse::<Filters>().is_err());
        assert!("=debug".parse::<Filters>().is_err());
    }
}
