//! RCON transport seam
//!
//! The wire protocol itself is an external capability consumed through the
//! `rcon` client crate; these traits keep the session manager (and its
//! tests) independent of the concrete transport.

use async_trait::async_trait;
use rcon::Connection;
use tokio::net::TcpStream;

use super::{RconError, RconResult};

/// An established, authenticated RCON connection
#[async_trait]
pub trait RconLink: Send {
    /// Execute a raw command and return the server's response text
    async fn exec(&mut self, command: &str) -> RconResult<String>;

    /// Whether the link is still considered authenticated
    fn is_authenticated(&self) -> bool;
}

/// Factory for [`RconLink`] handles
#[async_trait]
pub trait RconConnector: Send + Sync {
    /// Open and authenticate a new connection
    async fn connect(&self) -> RconResult<Box<dyn RconLink>>;
}

/// Production connector for a Project Zomboid server (Source RCON over TCP)
pub struct ZomboidConnector {
    address: String,
    password: String,
}

impl ZomboidConnector {
    /// Create a connector for `host:port` with the given password
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            address: format!("{}:{}", host.into(), port),
            password: password.into(),
        }
    }

    /// The target address in `host:port` form
    pub fn address(&self) -> &str {
        &self.address
    }
}

struct ZomboidLink {
    conn: Connection<TcpStream>,
}

#[async_trait]
impl RconLink for ZomboidLink {
    async fn exec(&mut self, command: &str) -> RconResult<String> {
        self.conn
            .cmd(command)
            .await
            .map_err(|e| RconError::Exec(e.to_string()))
    }

    fn is_authenticated(&self) -> bool {
        // The rcon crate authenticates during connect and has no
        // re-authentication path; a live handle is an authenticated one.
        true
    }
}

#[async_trait]
impl RconConnector for ZomboidConnector {
    async fn connect(&self) -> RconResult<Box<dyn RconLink>> {
        let conn = <Connection<TcpStream>>::builder()
            .connect(self.address.as_str(), &self.password)
            .await
            .map_err(|e| RconError::Connect(e.to_string()))?;

        Ok(Box::new(ZomboidLink { conn }))
    }
}
