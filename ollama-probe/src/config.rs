//! Runner configuration.
//!
//! [`ProbeConfig::default`] targets a stock local Ollama install
//! (`http://localhost:11434`, model `llama3:8b`, prompt `Say hello`, 10 s for
//! the listing call and 30 s for the chat call). [`ProbeConfig::from_env`]
//! layers the usual Ollama environment variables on top.

use std::time::Duration;

use reqwest::Url;

use crate::{Error, Result};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 11434;
pub const DEFAULT_MODEL: &str = "llama3:8b";
pub const DEFAULT_PROMPT: &str = "Say hello";
pub const DEFAULT_TAGS_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CHAT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where to probe, what to ask, and how long to wait.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Path prefix the API is served under, e.g. `/ollama` behind a proxy.
    /// Empty for a server at the root.
    pub path: String,
    pub model: String,
    pub prompt: String,
    pub tags_timeout: Duration,
    pub chat_timeout: Duration,
    pub api_key: Option<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: String::new(),
            model: DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            tags_timeout: DEFAULT_TAGS_TIMEOUT,
            chat_timeout: DEFAULT_CHAT_TIMEOUT,
            api_key: None,
        }
    }
}

impl ProbeConfig {
    /// Defaults overridden by `OLLAMA_HOST`, `OLLAMA_API_KEY`,
    /// `OLLAMA_PROBE_MODEL` and `OLLAMA_PROBE_PROMPT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ProbeConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = non_empty("OLLAMA_HOST") {
            config = config.with_ollama_host(&host)?;
        }
        if let Some(api_key) = non_empty("OLLAMA_API_KEY") {
            config.api_key = Some(api_key);
        }
        if let Some(model) = non_empty("OLLAMA_PROBE_MODEL") {
            config.model = model;
        }
        if let Some(prompt) = non_empty("OLLAMA_PROBE_PROMPT") {
            config.prompt = prompt;
        }

        Ok(config)
    }

    /// Applies an `OLLAMA_HOST`-style value: `host`, `host:port`, or a URL,
    /// optionally followed by a path prefix.
    ///
    /// Without a scheme the port defaults to 11434. With an explicit `http` or
    /// `https` scheme it defaults to that scheme's well-known port. IPv6
    /// addresses may be given bare (`::1`) or bracketed (`[::1]:11434`).
    pub fn with_ollama_host(mut self, value: &str) -> Result<Self> {
        let value = value.trim();
        let invalid = |e: &dyn std::fmt::Display| {
            Error::Client(format!("Invalid OLLAMA_HOST {:?}: {}", value, e))
        };

        let (scheme, rest) = match value.split_once("://") {
            Some((scheme, rest)) => (Some(scheme), rest),
            None => (None, value),
        };
        let (hostport, path) = match rest.find('/') {
            Some(i) => rest.split_at(i),
            None => (rest, ""),
        };

        // A bare IPv6 address has more than one colon and no brackets.
        let hostport = if !hostport.starts_with('[') && hostport.matches(':').count() > 1 {
            format!("[{}]", hostport)
        } else {
            hostport.to_string()
        };
        let hostport = if hostport.is_empty() || hostport.starts_with(':') {
            format!("{}{}", DEFAULT_HOST, hostport)
        } else {
            hostport
        };

        let raw = format!("{}://{}{}", scheme.unwrap_or("http"), hostport, path);
        let url = Url::parse(&raw).map_err(|e| invalid(&e))?;
        let host = url
            .host_str()
            .ok_or_else(|| invalid(&"missing host"))?
            .to_string();

        self.port = match scheme {
            Some(_) => url.port_or_known_default().unwrap_or(DEFAULT_PORT),
            None => explicit_port(&hostport).map_err(|e| invalid(&e))?.unwrap_or(DEFAULT_PORT),
        };
        self.scheme = url.scheme().to_string();
        self.host = host;
        self.path = url.path().trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_tags_timeout(mut self, timeout: Duration) -> Self {
        self.tags_timeout = timeout;
        self
    }

    pub fn with_chat_timeout(mut self, timeout: Duration) -> Self {
        self.chat_timeout = timeout;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The API root, always ending in `/`, e.g. `http://localhost:11434/`.
    pub fn base_url(&self) -> Result<Url> {
        let path = self.path.trim_matches('/');
        let raw = if path.is_empty() {
            format!("{}://{}:{}/", self.scheme, self.host, self.port)
        } else {
            format!("{}://{}:{}/{}/", self.scheme, self.host, self.port, path)
        };
        Url::parse(&raw).map_err(|e| Error::Client(format!("Invalid base URL {:?}: {}", raw, e)))
    }
}

/// The port written after the host, if any. `Url` hides an explicit port
/// equal to the scheme default, which matters when no scheme was given.
fn explicit_port(hostport: &str) -> std::result::Result<Option<u16>, std::num::ParseIntError> {
    let after_host = match hostport.rfind(']') {
        Some(i) => &hostport[i + 1..],
        None => hostport,
    };
    match after_host.rsplit_once(':') {
        Some((_, port)) => port.parse().map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_target_local_ollama() -> Result<()> {
        let config = ProbeConfig::default();
        assert_eq!(config.base_url()?.as_str(), "http://localhost:11434/");
        assert_eq!(config.model, "llama3:8b");
        assert_eq!(config.prompt, "Say hello");
        assert_eq!(config.tags_timeout, Duration::from_secs(10));
        assert_eq!(config.chat_timeout, Duration::from_secs(30));
        assert_eq!(config.api_key, None);
        Ok(())
    }

    #[test]
    fn empty_environment_keeps_defaults() -> Result<()> {
        let config = ProbeConfig::from_lookup(lookup(&[("OLLAMA_HOST", "  ")]))?;
        assert_eq!(config, ProbeConfig::default());
        Ok(())
    }

    #[test]
    fn environment_overrides_model_prompt_and_key() -> Result<()> {
        let config = ProbeConfig::from_lookup(lookup(&[
            ("OLLAMA_PROBE_MODEL", "mistral:7b"),
            ("OLLAMA_PROBE_PROMPT", "Ping"),
            ("OLLAMA_API_KEY", "secret"),
        ]))?;
        assert_eq!(config.model, "mistral:7b");
        assert_eq!(config.prompt, "Ping");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        Ok(())
    }

    #[test]
    fn ollama_host_forms() -> Result<()> {
        let base = ProbeConfig::default();

        let bare = base.clone().with_ollama_host("10.0.0.5")?;
        assert_eq!(bare.base_url()?.as_str(), "http://10.0.0.5:11434/");

        let with_port = base.clone().with_ollama_host("gpu-box:8080")?;
        assert_eq!(with_port.base_url()?.as_str(), "http://gpu-box:8080/");

        let only_port = base.clone().with_ollama_host(":9000")?;
        assert_eq!(only_port.base_url()?.as_str(), "http://localhost:9000/");

        let https = base.clone().with_ollama_host("https://ollama.example.com")?;
        assert_eq!(https.scheme, "https");
        assert_eq!(https.port, 443);

        let url = base.with_ollama_host("http://127.0.0.1:11500")?;
        assert_eq!(url.host, "127.0.0.1");
        assert_eq!(url.port, 11500);
        Ok(())
    }

    #[test]
    fn setters_compose() -> Result<()> {
        let config = ProbeConfig::default()
            .with_host("ollama.internal")
            .with_port(8080)
            .with_api_key("token");
        assert_eq!(config.base_url()?.as_str(), "http://ollama.internal:8080/");
        assert_eq!(config.api_key.as_deref(), Some("token"));
        Ok(())
    }

    #[test]
    fn ipv6_hosts() -> Result<()> {
        let base = ProbeConfig::default();

        let bare = base.clone().with_ollama_host("::1")?;
        assert_eq!(bare.host, "[::1]");
        assert_eq!(bare.port, 11434);
        assert_eq!(bare.base_url()?.as_str(), "http://[::1]:11434/");

        let bracketed = base.clone().with_ollama_host("[::1]:9000")?;
        assert_eq!(bracketed.base_url()?.as_str(), "http://[::1]:9000/");

        let url = base.with_ollama_host("http://[fe80::1]:8080")?;
        assert_eq!(url.host, "[fe80::1]");
        assert_eq!(url.port, 8080);
        Ok(())
    }

    #[test]
    fn path_prefix_is_kept() -> Result<()> {
        let base = ProbeConfig::default();

        let url = base.clone().with_ollama_host("https://proxy.example.com/ollama/")?;
        assert_eq!(url.path, "/ollama");
        assert_eq!(url.base_url()?.as_str(), "https://proxy.example.com/ollama/");

        let bare = base.with_ollama_host("gpu-box:8080/llm")?;
        assert_eq!(bare.base_url()?.as_str(), "http://gpu-box:8080/llm/");
        Ok(())
    }

    #[test]
    fn explicit_default_port_without_scheme_is_honoured() -> Result<()> {
        let config = ProbeConfig::default().with_ollama_host("gpu-box:80")?;
        assert_eq!(config.port, 80);
        Ok(())
    }

    #[test]
    fn malformed_port_is_a_client_error() {
        let err = ProbeConfig::default()
            .with_ollama_host("gpu-box:http")
            .unwrap_err();
        assert!(matches!(err, Error::Client(_)));
    }

    #[test]
    fn malformed_url_is_a_client_error() {
        let err = ProbeConfig::default()
            .with_ollama_host("http://exa mple.com")
            .unwrap_err();
        assert!(matches!(err, Error::Client(_)));
    }
}
