//! Shared outbound HTTP client

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::config::HttpConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const TCP_KEEPALIVE: Duration = Duration::from_secs(30);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const POOL_MAX_IDLE_PER_HOST: usize = 20;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Build the reqwest client shared by the transport and backend clients
///
/// With `prefer_ipv4` the client binds to the IPv4 wildcard address, so
/// every connection goes out over IPv4.
pub fn build(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let timeout = if config.timeout_secs == 0 {
        DEFAULT_TIMEOUT
    } else {
        config.timeout()
    };
    debug!(?timeout, prefer_ipv4 = config.prefer_ipv4, "httpclient::build: called");

    let mut builder = Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT)
        .tcp_keepalive(TCP_KEEPALIVE)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .user_agent(concat!("probanana/", env!("CARGO_PKG_VERSION")));

    if config.prefer_ipv4 {
        debug!("httpclient::build: binding to IPv4");
        builder = builder.local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    builder.build()
}
