//! Runtime configuration
//!
//! Every setting can be passed as a flag or read from the environment. The binary loads a
//! `.env` file first when one is present.

use std::path::PathBuf;

use clap::Args;

use crate::{
    address::{ViaCepClient, viacep::DEFAULT_BASE_URL},
    cart::FileStorage,
    coupons::{CouponRegistry, CouponRegistryError},
};

/// Shop configuration.
#[derive(Debug, Args)]
pub struct ShopConfig {
    /// Store contact settings.
    #[command(flatten)]
    pub store: StoreConfig,

    /// Postal-code lookup settings.
    #[command(flatten)]
    pub lookup: LookupConfig,

    /// Local storage settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

/// Where orders are handed off to.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// Store contact number in international form, e.g. 5511999999999
    #[arg(long, env = "STORE_CONTACT", default_value = "")]
    pub store_contact: String,
}

/// Postal-code lookup service.
#[derive(Debug, Args)]
pub struct LookupConfig {
    /// Base URL of the `ViaCEP`-compatible lookup service
    #[arg(long, env = "POSTAL_CODE_LOOKUP_URL", default_value = DEFAULT_BASE_URL)]
    pub postal_code_lookup_url: String,
}

/// Local files.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// Cart file
    #[arg(long, env = "CART_PATH", default_value = ".boutique/cart.json")]
    pub cart_path: PathBuf,

    /// Coupon registry YAML file; the built-in codes are used when omitted
    #[arg(long, env = "COUPONS_PATH")]
    pub coupons_path: Option<PathBuf>,
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    #[default]
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl ShopConfig {
    /// The coupon registry: the configured file, or the built-in codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured file cannot be read or is invalid.
    pub fn coupon_registry(&self) -> Result<CouponRegistry, CouponRegistryError> {
        match &self.storage.coupons_path {
            Some(path) => CouponRegistry::load(path),
            None => Ok(CouponRegistry::default()),
        }
    }

    /// File-backed cart storage at the configured path.
    #[must_use]
    pub fn cart_storage(&self) -> FileStorage {
        FileStorage::new(self.storage.cart_path.clone())
    }

    /// Lookup client for the configured service.
    #[must_use]
    pub fn lookup_client(&self) -> ViaCepClient {
        ViaCepClient::new(self.lookup.postal_code_lookup_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use tempfile::tempdir;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ShopConfig,
    }

    fn parse(args: &[&str]) -> TestResult<ShopConfig> {
        let cli = TestCli::try_parse_from(std::iter::once("boutique").chain(args.iter().copied()))?;

        Ok(cli.config)
    }

    #[test]
    fn flags_populate_sections() -> TestResult {
        let config = parse(&[
            "--store-contact",
            "5511999990000",
            "--postal-code-lookup-url",
            "http://localhost:9000/ws",
            "--cart-path",
            "/tmp/cart.json",
            "--log-format",
            "json",
        ])?;

        assert_eq!(config.store.store_contact, "5511999990000");
        assert_eq!(config.lookup.postal_code_lookup_url, "http://localhost:9000/ws");
        assert_eq!(config.storage.cart_path, PathBuf::from("/tmp/cart.json"));
        assert_eq!(config.logging.log_format, LogFormat::Json);

        Ok(())
    }

    #[test]
    fn registry_falls_back_to_builtin_codes() -> TestResult {
        let config = parse(&[])?;

        let registry = config.coupon_registry()?;

        assert_eq!(registry.evaluate("PROMO10")?.percent_off(), 10);
        assert_eq!(registry.evaluate("frete")?.percent_off(), 0);

        Ok(())
    }

    #[test]
    fn registry_loads_configured_file() -> TestResult {
        let dir = tempdir()?;
        let path = dir.path().join("coupons.yml");

        fs::write(&path, "coupons:\n  VERAO25: 25\n")?;

        let config = parse(&["--coupons-path", path.to_str().ok_or("non-utf8 path")?])?;
        let registry = config.coupon_registry()?;

        assert_eq!(registry.evaluate("verao25")?.percent_off(), 25);
        assert!(registry.evaluate("PROMO10").is_err(), "built-ins are replaced");

        Ok(())
    }

    #[test]
    fn missing_registry_file_is_an_error() -> TestResult {
        let dir = tempdir()?;
        let path = dir.path().join("missing.yml");

        let config = parse(&["--coupons-path", path.to_str().ok_or("non-utf8 path")?])?;

        assert!(matches!(
            config.coupon_registry(),
            Err(CouponRegistryError::Io(_))
        ));

        Ok(())
    }
}
