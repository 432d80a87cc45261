use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use reqwest::Url;

pub const DEFAULT_SERVER_URL: &str =
    "https://bigquery-mcp-server-70394249237.asia-northeast1.run.app/message";
pub const DEFAULT_USER_AGENT: &str = "BigQuery-MCP-Bridge/1.0.0";

#[derive(Debug, Clone)]
pub struct Config {
    pub url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Parser, Debug)]
#[command(name = "mcp-http-bridge")]
#[command(about = "Bridge line-delimited JSON-RPC on stdio to an HTTP JSON-RPC endpoint", long_about = None)]
pub struct Cli {
    /// Endpoint every request is POSTed to
    #[arg(long, env = "MCP_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub url: String,
    /// Seconds to wait for each backend response
    #[arg(long, env = "MCP_BRIDGE_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    #[arg(long, env = "MCP_BRIDGE_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
    /// Log filter directive; logs go to stderr
    #[arg(long, env = "MCP_BRIDGE_LOG", default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    pub fn from_args() -> Self {
        Self::parse()
    }

    pub fn into_config(self) -> anyhow::Result<Config> {
        let url = Url::parse(&self.url).with_context(|| format!("invalid server url {:?}", self.url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("unsupported url scheme {:?}, expected http or https", url.scheme());
        }
        if self.timeout_secs == 0 {
            bail!("timeout must be at least one second");
        }

        Ok(Config {
            url,
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent,
        })
    }
}
