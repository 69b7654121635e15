use std::{net::SocketAddr, str::FromStr, sync::Arc, time::Duration};

use axum::{Extension, Router, routing::get};
use tokio::{
    sync::{Mutex, oneshot},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, warn};

use crate::{
    api::{self, CallbackOutcome, SharedOutcome},
    config,
    error::{Error, Failure, Result},
};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Local HTTP server receiving the authorization-code redirect.
///
/// Point the app's redirect URI at [`CallbackServer::redirect_uri`], send the
/// user to the authorization URL, then await [`CallbackServer::wait_for_code`].
pub struct CallbackServer {
    local_addr: SocketAddr,
    outcome: SharedOutcome,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl CallbackServer {
    /// Binds `addr` and starts serving `/callback` and `/health`.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let outcome: SharedOutcome = Arc::new(Mutex::new(None));

        let app = Router::new()
            .route("/health", get(api::health))
            .route(
                "/callback",
                get(api::callback).layer(Extension(Arc::clone(&outcome))),
            );

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let (shutdown, stopped) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = stopped.await;
            });
            if let Err(e) = serve.await {
                warn!(error = %e, "callback server stopped with an error");
            }
        });
        debug!(%local_addr, "callback server listening");

        Ok(Self {
            local_addr,
            outcome,
            shutdown: Some(shutdown),
            handle,
        })
    }

    /// Binds the address configured in `SERVER_ADDRESS`.
    pub async fn from_env() -> Result<Self> {
        let addr = config::server_addr().ok_or(Error::MissingParameter("SERVER_ADDRESS"))?;
        let addr = SocketAddr::from_str(&addr)
            .map_err(|e| Error::unexpected(format!("invalid server address {addr}: {e}")))?;
        Self::bind(addr).await
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://{}/callback", self.local_addr)
    }

    /// Waits for the redirect and returns the authorization code.
    ///
    /// The server is shut down once this returns, whatever the outcome.
    pub async fn wait_for_code(
        mut self,
        expected_state: Option<&str>,
        timeout: Duration,
    ) -> Result<String> {
        let result = self.poll_outcome(timeout).await;
        self.stop().await;

        match result? {
            CallbackOutcome::Denied(error) => {
                Err(Error::unexpected(format!("authorization denied: {error}")))
            }
            CallbackOutcome::Code { code, state } => {
                if let Some(expected) = expected_state {
                    if state.as_deref() != Some(expected) {
                        return Err(Error::unexpected("authorization state mismatch"));
                    }
                }
                Ok(code)
            }
        }
    }

    async fn poll_outcome(&self, timeout: Duration) -> Result<CallbackOutcome> {
        let start = Instant::now();

        while start.elapsed() < timeout {
            if let Some(outcome) = self.outcome.lock().await.take() {
                return Ok(outcome);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        Err(Error::UnexpectedFailure(Failure::Timeout(timeout.as_secs())))
    }

    async fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        match tokio::time::timeout(SHUTDOWN_GRACE, &mut self.handle).await {
            Ok(Err(e)) => warn!(error = %e, "callback server task failed"),
            Err(_) => self.handle.abort(),
            Ok(Ok(())) => {}
        }
    }
}
