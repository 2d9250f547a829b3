use std::{env, time::Duration};

use log::*;
use paypal_tools::PayPalConfig;

const DEFAULT_VSP_HOST: &str = "127.0.0.1";
const DEFAULT_VSP_PORT: u16 = 8480;
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// TTL applied to every entry in the in-process read cache.
    pub cache_ttl: Duration,
    /// Where shoppers get sent after the gateway hands them back to us.
    pub frontend: FrontendConfig,
    /// Payment gateway configuration
    pub paypal: PayPalConfig,
}

/// The storefront urls the redirect endpoints send shoppers to. The invoice id gets appended to
/// `checkout_url` verbatim, so it should end with a path separator or query prefix.
#[derive(Clone, Debug, Default)]
pub struct FrontendConfig {
    pub checkout_url: String,
    pub cancel_url: String,
    pub error_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_VSP_HOST.to_string(),
            port: DEFAULT_VSP_PORT,
            database_url: String::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            frontend: FrontendConfig::default(),
            paypal: PayPalConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("VSP_HOST").ok().unwrap_or_else(|| DEFAULT_VSP_HOST.into());
        let port = env::var("VSP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for VSP_PORT. {e} Using the default, {DEFAULT_VSP_PORT}, instead."
                    );
                    DEFAULT_VSP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_VSP_PORT);
        let database_url = env::var("VSP_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ VSP_DATABASE_URL is not set. Please set it to the URL for the store database.");
            String::default()
        });
        let cache_ttl = env::var("VSP_CACHE_TTL_SECS")
            .map_err(|_| {
                info!("🪛️ VSP_CACHE_TTL_SECS is not set. Using the default of {} s.", DEFAULT_CACHE_TTL.as_secs())
            })
            .and_then(|s| {
                s.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for VSP_CACHE_TTL_SECS. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_CACHE_TTL);
        let frontend = FrontendConfig::from_env_or_default();
        let paypal = PayPalConfig::new_from_env_or_default();
        Self { host, port, database_url, cache_ttl, frontend, paypal }
    }
}

impl FrontendConfig {
    pub fn from_env_or_default() -> Self {
        let frontend_url = env::var("VSP_FRONTEND_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ VSP_FRONTEND_URL is not set. Redirects will point at localhost.");
            "http://localhost:3000".to_string()
        });
        let checkout_url =
            env::var("VSP_FRONTEND_CHECKOUT_URL").ok().unwrap_or_else(|| format!("{frontend_url}/checkout/"));
        let cancel_url = env::var("VSP_FRONTEND_CANCEL_URL").ok().unwrap_or_else(|| format!("{frontend_url}/cart"));
        let error_url = format!("{frontend_url}/error");
        Self { checkout_url, cancel_url, error_url }
    }
}
