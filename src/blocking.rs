//! Blocking client.
//!
//! Wraps [`GraphClient`] with a private current-thread runtime so every
//! call blocks the calling thread until the engine answers. Do not use
//! it from inside an async context; await [`GraphClient`] there instead.

use tokio::runtime::{Builder, Runtime};

use crate::client::GraphClient;
use crate::config::{ClientConfig, WeightProperty};
use crate::driver::Driver;
use crate::model::{PathRecord, RankRecord, Value};
use crate::Result;

pub struct Client<D: Driver> {
    inner: GraphClient<D>,
    runtime: Runtime,
}

impl<D: Driver> Client<D> {
    /// Wrap a driver, verifying connectivity first.
    pub fn with_driver(driver: D, config: ClientConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let inner = runtime.block_on(GraphClient::with_driver(driver, config))?;
        Ok(Self { inner, runtime })
    }

    pub fn pagerank(&self, max_iterations: u32, weight_property: &str) -> Result<Vec<RankRecord>> {
        self.runtime.block_on(self.inner.pagerank(max_iterations, weight_property))
    }

    pub fn pagerank_with(&self, max_iterations: u32, weight: Option<WeightProperty>) -> Result<Vec<RankRecord>> {
        self.runtime.block_on(self.inner.pagerank_with(max_iterations, weight))
    }

    pub fn bfs(&self, start: impl Into<Value>, last: impl Into<Value>) -> Result<Vec<PathRecord>> {
        self.runtime.block_on(self.inner.bfs(start, last))
    }

    pub fn close(&self) -> Result<()> {
        self.runtime.block_on(self.inner.close())
    }

    /// The async client underneath.
    pub fn get_ref(&self) -> &GraphClient<D> {
        &self.inner
    }
}

#[cfg(feature = "bolt")]
impl Client<crate::driver::BoltDriver> {
    /// Connect over Bolt with the default projection settings.
    pub fn connect(uri: &str, user: &str, password: &str) -> Result<Self> {
        let conn = crate::config::ConnectionConfig::new(uri, user, password);
        Self::connect_with(&conn, ClientConfig::default())
    }

    pub fn connect_with(conn: &crate::config::ConnectionConfig, config: ClientConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let inner = runtime.block_on(GraphClient::connect_with(conn, config))?;
        Ok(Self { inner, runtime })
    }
}
