//! One logical ledger request: session resolution plus transport.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::transport::envelope::RequestEnvelope;
use crate::transport::http::{HttpTransport, LedgerResponse};
use crate::transport::session::SessionResolver;

/// Shared connection to a single ledger.
#[derive(Clone)]
pub struct Connection {
    transport: HttpTransport,
    session: SessionResolver,
}

impl Connection {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        let session = SessionResolver::new(config, transport.clone())?;
        Ok(Self { transport, session })
    }

    pub fn session(&self) -> &SessionResolver {
        &self.session
    }

    /// POST `body` to `{ledger_url}/{path}`.
    pub async fn send(&self, path: &str, body: Value) -> Result<LedgerResponse> {
        let session = self.session.resolve().await?;
        let url = format!("{}/{}", session.ledger_url, path.trim_start_matches('/'));
        self.transport.send(&RequestEnvelope::new(url, body)).await
    }

    /// Like [`Connection::send`], returning only the camelized body.
    pub async fn request(&self, path: &str, body: Value) -> Result<Value> {
        Ok(self.send(path, body).await?.body)
    }

    /// Like [`Connection::send`], decoding the body into `T`.
    pub async fn request_as<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        self.send(path, body).await?.decode()
    }

    /// POST to an absolute URL, bypassing session resolution.
    pub async fn request_raw(&self, url: &str, body: Value) -> Result<Value> {
        Ok(self.transport.send(&RequestEnvelope::new(url, body)).await?.body)
    }
}
