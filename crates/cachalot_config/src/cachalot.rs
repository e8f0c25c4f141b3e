use serde::Deserialize;

use crate::{GlobalConfig, ProxyConfig, StaticConfig};

// =======================================================
// CACHALOT CONFIG — main config
// =======================================================
#[derive(Debug, Default, Deserialize)]
pub struct CachalotConfig {
    #[serde(default)]
    pub global: GlobalConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    #[serde(rename = "static")]
    pub static_site: StaticConfig,
}

impl CachalotConfig {
    pub fn global(&self) -> &GlobalConfig {
        &self.global
    }

    pub fn proxy(&self) -> &ProxyConfig {
        &self.proxy
    }

    pub fn static_site(&self) -> &StaticConfig {
        &self.static_site
    }

    pub fn from_file(file_name: &str) -> Result<Self, config::ConfigError> {
        let built = config::Config::builder()
            .add_source(config::File::new(file_name, config::FileFormat::Ini).required(false))
            .build()?;

        built.try_deserialize()
    }

    pub fn from_file_or_default(file_name: &str) -> Self {
        match Self::from_file(file_name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Error reading config '{file_name}': {e}");
                eprintln!("Using default config (in-memory)...");
                CachalotConfig::default()
            }
        }
    }

    pub fn print(&self) {
        println!("=============== CACHALOT CONFIG ===============");
        println!("\n[global]");
        println!("  max_connections      = {}", self.global.max_connections);
        println!("\n[proxy]");
        println!("  listen               = {}", self.proxy.listen);
        println!("  cache_dir            = {}", self.proxy.cache_dir);
        println!("  cache_ttl_secs       = {}", self.proxy.cache_ttl_secs);
        println!("  cache_max_entries    = {}", self.proxy.cache_max_entries);
        println!(
            "  connect_timeout_secs = {}",
            self.proxy.connect_timeout_secs
        );
        println!(
            "  upstream_read_timeout_secs = {}",
            self.proxy.upstream_read_timeout_secs
        );
        println!(
            "  client_read_timeout_secs   = {}",
            self.proxy.client_read_timeout_secs
        );
        println!("\n[static]");
        println!("  listen               = {}", self.static_site.listen);
        println!("  root                 = {}", self.static_site.root);
        println!("  index                = {}", self.static_site.index);
        println!(
            "  client_read_timeout_secs   = {}",
            self.static_site.client_read_timeout_secs
        );
        println!("===============================================");
    }
}
