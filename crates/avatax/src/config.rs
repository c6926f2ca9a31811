//! Connection settings for the AvaTax REST API.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use taxsvc::CompanyCode;
use thiserror::Error;
use url::Url;

pub const SANDBOX_URL: &str = "https://sandbox-rest.avatax.com";
pub const PRODUCTION_URL: &str = "https://rest.avatax.com";

/// Client library generation reported in the `X-Avalara-Client` header.
const CLIENT_GENERATION: &str = "2";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while loading [`AvaTaxConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A required setting is absent.
    #[error("missing configuration value {0}")]
    Missing(&'static str),

    /// A setting is present but cannot be used.
    #[error("invalid value for {name}: {message}")]
    Invalid {
        name: &'static str,
        message: String,
    },
}

/// Which AvaTax deployment to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_URL,
            Self::Production => PRODUCTION_URL,
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "development" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        })
    }
}

/// Credentials and endpoint for one AvaTax account.
///
/// The license key is kept in a [`SecretString`] and never appears in
/// `Debug` output or logs.
#[derive(Debug)]
pub struct AvaTaxConfig {
    pub account_id: String,
    pub license_key: SecretString,
    pub environment: Environment,
    /// Overrides the environment's base URL (proxies, test servers).
    pub endpoint: Option<Url>,
    /// Company that voided transactions are looked up under.
    pub company_code: CompanyCode,
    pub timeout: Duration,
    /// Reported to AvaTax in the `X-Avalara-Client` header.
    pub app_name: String,
    pub app_version: String,
    pub machine_name: String,
}

impl AvaTaxConfig {
    /// Sandbox settings for the given credentials, all else defaulted.
    pub fn new(account_id: impl Into<String>, license_key: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            license_key: SecretString::from(license_key.into()),
            environment: Environment::default(),
            endpoint: None,
            company_code: CompanyCode::default(),
            timeout: DEFAULT_TIMEOUT,
            app_name: "taxsvc".to_owned(),
            app_version: env!("CARGO_PKG_VERSION").to_owned(),
            machine_name: "unknown".to_owned(),
        }
    }

    /// Reads settings from the process environment.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `AVATAX_ACCOUNT_ID` | required |
    /// | `AVATAX_LICENSE_KEY` | required |
    /// | `AVATAX_ENVIRONMENT` | `sandbox` |
    /// | `AVATAX_ENDPOINT` | environment's URL |
    /// | `AVATAX_COMPANY_CODE` | `DEFAULT` |
    /// | `AVATAX_TIMEOUT_SECS` | `30` |
    /// | `AVATAX_APP_NAME` | `taxsvc` |
    /// | `HOSTNAME` | `unknown` |
    ///
    /// # Errors
    ///
    /// [`ConfigError`] for missing credentials or unparseable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`AvaTaxConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`AvaTaxConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let account_id =
            get("AVATAX_ACCOUNT_ID").ok_or(ConfigError::Missing("AVATAX_ACCOUNT_ID"))?;
        let license_key =
            get("AVATAX_LICENSE_KEY").ok_or(ConfigError::Missing("AVATAX_LICENSE_KEY"))?;
        let mut config = Self::new(account_id, license_key);

        if let Some(env) = get("AVATAX_ENVIRONMENT") {
            config.environment = env.parse().map_err(|message| ConfigError::Invalid {
                name: "AVATAX_ENVIRONMENT",
                message,
            })?;
        }
        if let Some(endpoint) = get("AVATAX_ENDPOINT") {
            let url = Url::parse(&endpoint).map_err(|e| ConfigError::Invalid {
                name: "AVATAX_ENDPOINT",
                message: e.to_string(),
            })?;
            config.endpoint = Some(url);
        }
        if let Some(company) = get("AVATAX_COMPANY_CODE") {
            config.company_code = CompanyCode::new(company).ok_or(ConfigError::Invalid {
                name: "AVATAX_COMPANY_CODE",
                message: "must not be empty".to_owned(),
            })?;
        }
        if let Some(secs) = get("AVATAX_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|e| ConfigError::Invalid {
                name: "AVATAX_TIMEOUT_SECS",
                message: format!("{e}"),
            })?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    name: "AVATAX_TIMEOUT_SECS",
                    message: "must be greater than zero".to_owned(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(app) = get("AVATAX_APP_NAME") {
            config.app_name = app;
        }
        if let Some(host) = get("HOSTNAME") {
            config.machine_name = host;
        }
        Ok(config)
    }

    /// The URL requests are sent to: the override if set, else the
    /// environment's.
    ///
    /// # Errors
    ///
    /// Never for the built-in environment URLs.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        match &self.endpoint {
            Some(url) => Ok(url.clone()),
            None => Url::parse(self.environment.base_url()).map_err(|e| ConfigError::Invalid {
                name: "AVATAX_ENVIRONMENT",
                message: e.to_string(),
            }),
        }
    }

    /// Value of the `X-Avalara-Client` identification header.
    pub fn client_header(&self) -> String {
        format!(
            "{}; {}; RustClient; {CLIENT_GENERATION}; {}",
            self.app_name, self.app_version, self.machine_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn credentials_are_required() {
        assert_eq!(
            AvaTaxConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::Missing("AVATAX_ACCOUNT_ID")
        );
        assert_eq!(
            AvaTaxConfig::from_lookup(lookup(&[("AVATAX_ACCOUNT_ID", "1100000000")])).unwrap_err(),
            ConfigError::Missing("AVATAX_LICENSE_KEY")
        );
    }

    #[test]
    fn defaults_to_sandbox() {
        let config = AvaTaxConfig::from_lookup(lookup(&[
            ("AVATAX_ACCOUNT_ID", "1100000000"),
            ("AVATAX_LICENSE_KEY", "secret-key"),
        ]))
        .unwrap();

        assert_eq!(config.environment, Environment::Sandbox);
        assert_eq!(config.base_url().unwrap().as_str(), "https://sandbox-rest.avatax.com/");
        assert_eq!(config.company_code.as_str(), "DEFAULT");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.license_key.expose_secret(), "secret-key");
    }

    #[test]
    fn reads_all_overrides() {
        let config = AvaTaxConfig::from_lookup(lookup(&[
            ("AVATAX_ACCOUNT_ID", "1100000000"),
            ("AVATAX_LICENSE_KEY", "secret-key"),
            ("AVATAX_ENVIRONMENT", "Production"),
            ("AVATAX_COMPANY_CODE", "SHOP1"),
            ("AVATAX_TIMEOUT_SECS", "5"),
            ("AVATAX_APP_NAME", "checkout"),
            ("HOSTNAME", "web-1"),
        ]))
        .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.base_url().unwrap().as_str(), "https://rest.avatax.com/");
        assert_eq!(config.company_code.as_str(), "SHOP1");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(
            config.client_header(),
            format!("checkout; {}; RustClient; 2; web-1", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn endpoint_override_wins() {
        let config = AvaTaxConfig::from_lookup(lookup(&[
            ("AVATAX_ACCOUNT_ID", "1"),
            ("AVATAX_LICENSE_KEY", "k"),
            ("AVATAX_ENVIRONMENT", "production"),
            ("AVATAX_ENDPOINT", "http://127.0.0.1:8080"),
        ]))
        .unwrap();
        assert_eq!(config.base_url().unwrap().as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn rejects_bad_values() {
        let base = [("AVATAX_ACCOUNT_ID", "1"), ("AVATAX_LICENSE_KEY", "k")];
        for (name, value) in [
            ("AVATAX_ENVIRONMENT", "staging"),
            ("AVATAX_ENDPOINT", "not a url"),
            ("AVATAX_TIMEOUT_SECS", "soon"),
            ("AVATAX_TIMEOUT_SECS", "0"),
        ] {
            let mut vars = base.to_vec();
            vars.push((name, value));
            match AvaTaxConfig::from_lookup(lookup(&vars)).unwrap_err() {
                ConfigError::Invalid { name: got, .. } => assert_eq!(got, name),
                other => panic!("unexpected error for {name}: {other:?}"),
            }
        }
    }

    #[test]
    fn debug_output_hides_license_key() {
        let config = AvaTaxConfig::new("1100000000", "super-secret");
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
