//! SPARQL 1.1 protocol transport for the stored-procedure interface

use crate::procedure::{Connector, ProcedureCall, Session, SPARQL_EXECUTE};
use crate::{Result, StoreConfig, StoreError};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Connects to a SPARQL endpoint over HTTP(S).
///
/// `SYS.SPARQL_EXECUTE` maps onto one POST: the header-block argument becomes
/// the request headers, the query is the body and the response body is the
/// output argument.
#[derive(Clone, Default)]
pub struct HttpConnector;

impl HttpConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self, config: &StoreConfig) -> Result<Box<dyn Session>> {
        let mut builder = Client::builder();
        if config.encrypt && !config.ssl_validate_certificate {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        Ok(Box::new(HttpSession {
            client: Some(client),
            url: config.endpoint_url(),
            user: config.user.clone(),
            password: config.password.clone(),
        }))
    }
}

struct HttpSession {
    client: Option<Client>,
    url: String,
    user: Option<String>,
    password: Option<String>,
}

#[async_trait]
impl Session for HttpSession {
    async fn call(&mut self, call: &ProcedureCall) -> Result<Vec<Option<String>>> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| StoreError::Procedure("session is closed".to_string()))?;

        if call.name != SPARQL_EXECUTE {
            return Err(StoreError::Procedure(format!(
                "unsupported procedure: {}",
                call.name
            )));
        }

        let query = call
            .arg_text(0)
            .ok_or_else(|| StoreError::Procedure("missing query argument".to_string()))?;
        let headers = call.arg_text(1).unwrap_or_default();

        let mut request = client.post(&self.url).body(query.to_string());
        for (name, value) in parse_header_block(headers) {
            request = request.header(name, value);
        }
        if let Some(user) = &self.user {
            request = request.basic_auth(user, self.password.as_deref());
        }

        debug!("POST {} ({} bytes)", self.url, query.len());

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                StoreError::Connect(e.to_string())
            } else {
                StoreError::Procedure(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Procedure(e.to_string()))?;

        if !status.is_success() {
            return Err(StoreError::Procedure(format!("{}: {}", status, body.trim())));
        }

        Ok(vec![
            Some(query.to_string()),
            Some(headers.to_string()),
            Some(body),
            None,
        ])
    }

    async fn close(&mut self) {
        self.client = None;
    }
}

/// Split a CRLF-separated `Name: value` block into header pairs
fn parse_header_block(block: &str) -> Vec<(String, String)> {
    block
        .split("\r\n")
        .flat_map(|line| line.split('\n'))
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}
