//! Graph store client: one connection and one procedure call per query

use crate::procedure::{Connector, ProcedureCall, PAYLOAD_POSITION};
use crate::{HttpConnector, Result, StoreConfig, StoreError};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Delimited-text body returned by the store
pub type RawPayload = String;

/// Executes SPARQL against the store.
///
/// Errors never escape as panics or transport errors: every failure is a
/// [`StoreError`] value the caller can report as data.
#[derive(Clone)]
pub struct GraphStoreClient {
    config: StoreConfig,
    connector: Arc<dyn Connector>,
}

impl GraphStoreClient {
    pub fn new(config: StoreConfig, connector: Arc<dyn Connector>) -> Self {
        Self { config, connector }
    }

    /// Client over the SPARQL HTTP protocol
    pub fn http(config: StoreConfig) -> Self {
        Self::new(config, Arc::new(HttpConnector::new()))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Run `query` through `SYS.SPARQL_EXECUTE` and return the raw CSV payload
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn execute(&self, query: &str) -> Result<RawPayload> {
        if query.trim().is_empty() {
            return Err(StoreError::EmptyQuery);
        }

        let mut session = self.connector.connect(&self.config).await.map_err(|e| {
            warn!("{}", e);
            e
        })?;

        let call = ProcedureCall::sparql_execute(query);
        let result = session.call(&call).await;
        session.close().await;

        let mut values = result.map_err(|e| {
            warn!("{}", e);
            e
        })?;

        if values.len() <= PAYLOAD_POSITION {
            return Err(StoreError::MissingOutput(PAYLOAD_POSITION));
        }
        let payload = values
            .swap_remove(PAYLOAD_POSITION)
            .ok_or(StoreError::MissingOutput(PAYLOAD_POSITION))?;

        debug!("Received {} bytes from store", payload.len());
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedure::Session;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Clone)]
    enum Reply {
        Values(Vec<Option<String>>),
        Fail(StoreError),
    }

    #[derive(Default)]
    struct Counters {
        connects: AtomicUsize,
        closes: AtomicUsize,
        calls: Mutex<Vec<ProcedureCall>>,
    }

    struct ScriptedConnector {
        refuse: bool,
        reply: Reply,
        counters: Arc<Counters>,
    }

    struct ScriptedSession {
        reply: Reply,
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl Connector for ScriptedConnector {
        async fn connect(&self, _config: &StoreConfig) -> Result<Box<dyn Session>> {
            self.counters.connects.fetch_add(1, Ordering::SeqCst);
            if self.refuse {
                return Err(StoreError::Connect("connection refused".into()));
            }
            Ok(Box::new(ScriptedSession {
                reply: self.reply.clone(),
                counters: self.counters.clone(),
            }))
        }
    }

    #[async_trait]
    impl Session for ScriptedSession {
        async fn call(&mut self, call: &ProcedureCall) -> Result<Vec<Option<String>>> {
            self.counters.calls.lock().unwrap().push(call.clone());
            match &self.reply {
                Reply::Values(values) => Ok(values.clone()),
                Reply::Fail(e) => Err(e.clone()),
            }
        }

        async fn close(&mut self) {
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn scripted_client(refuse: bool, reply: Reply) -> (GraphStoreClient, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let connector = ScriptedConnector {
            refuse,
            reply,
            counters: counters.clone(),
        };
        (
            GraphStoreClient::new(StoreConfig::default(), Arc::new(connector)),
            counters,
        )
    }

    fn ok_reply(payload: &str) -> Reply {
        Reply::Values(vec![None, None, Some(payload.to_string()), None])
    }

    #[tokio::test]
    async fn test_execute_returns_third_value() {
        let (client, counters) = scripted_client(false, ok_reply("count\n5"));
        let payload = client.execute("SELECT (COUNT(*) AS ?count) {}").await.unwrap();
        assert_eq!(payload, "count\n5");
        assert_eq!(counters.closes.load(Ordering::SeqCst), 1);

        let calls = counters.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ProcedureCall::sparql_execute("SELECT (COUNT(*) AS ?count) {}"));
    }

    #[tokio::test]
    async fn test_procedure_failure_closes_session() {
        let (client, counters) = scripted_client(
            false,
            Reply::Fail(StoreError::Procedure("syntax error near WHERE".into())),
        );
        let err = client.execute("SELECT").await.unwrap_err();
        assert!(err.to_string().contains("Error"));
        assert!(err.to_string().contains("syntax error near WHERE"));
        assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_is_error_value() {
        let (client, counters) = scripted_client(true, ok_reply(""));
        let err = client.execute("ASK {}").await.unwrap_err();
        assert!(matches!(err, StoreError::Connect(_)));
        assert!(err.to_string().starts_with("Error executing SPARQL query"));
        assert_eq!(counters.closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_output_value() {
        let (client, counters) = scripted_client(false, Reply::Values(vec![None, None, None, None]));
        let err = client.execute("ASK {}").await.unwrap_err();
        assert_eq!(err, StoreError::MissingOutput(2));
        assert_eq!(counters.closes.load(Ordering::SeqCst), 1);

        let (client, _) = scripted_client(false, Reply::Values(vec![Some("q".into())]));
        assert_eq!(client.execute("ASK {}").await.unwrap_err(), StoreError::MissingOutput(2));
    }

    #[tokio::test]
    async fn test_empty_query_skips_connection() {
        let (client, counters) = scripted_client(false, ok_reply("x"));
        assert_eq!(client.execute("  ").await.unwrap_err(), StoreError::EmptyQuery);
        assert_eq!(counters.connects.load(Ordering::SeqCst), 0);
    }
}
