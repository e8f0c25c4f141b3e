use serde::Deserialize;

mod cachalot;

pub use cachalot::CachalotConfig;

// =======================================================
// GLOBAL CONFIG + DEFAULTS
// =======================================================
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Upper bound on concurrent connections across both listeners.
    pub max_connections: u32,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            max_connections: 1024,
        }
    }
}

impl GlobalConfig {
    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }
}

// =======================================================
// PROXY CONFIG + DEFAULTS
// =======================================================
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub listen: String,

    // Cache control
    pub cache_dir: String,
    pub cache_ttl_secs: u64,
    pub cache_max_entries: usize,

    // Timeouts (seconds)
    pub connect_timeout_secs: u64,
    pub upstream_read_timeout_secs: u64,
    pub client_read_timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8888".into(),
            cache_dir: "proxy_cache".into(),
            cache_ttl_secs: 300,
            cache_max_entries: 1024,
            connect_timeout_secs: 5,
            upstream_read_timeout_secs: 30,
            client_read_timeout_secs: 15,
        }
    }
}

impl ProxyConfig {
    pub fn listen(&self) -> &str {
        &self.listen
    }

    pub fn cache_dir(&self) -> &str {
        &self.cache_dir
    }

    pub fn cache_ttl_secs(&self) -> u64 {
        self.cache_ttl_secs
    }

    pub fn cache_max_entries(&self) -> usize {
        self.cache_max_entries
    }

    pub fn connect_timeout_secs(&self) -> u64 {
        self.connect_timeout_secs
    }

    pub fn upstream_read_timeout_secs(&self) -> u64 {
        self.upstream_read_timeout_secs
    }

    pub fn client_read_timeout_secs(&self) -> u64 {
        self.client_read_timeout_secs
    }
}

// =======================================================
// STATIC FILE SERVER CONFIG + DEFAULTS
// =======================================================
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    pub listen: String,
    pub root: String,
    pub index: String,
    pub client_read_timeout_secs: u64,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:6789".into(),
            root: "www".into(),
            index: "index.html".into(),
            client_read_timeout_secs: 15,
        }
    }
}

impl StaticConfig {
    pub fn listen(&self) -> &str {
        &self.listen
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn client_read_timeout_secs(&self) -> u64 {
        self.client_read_timeout_secs
    }
}
