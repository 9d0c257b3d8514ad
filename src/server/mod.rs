//! Read-only HTTP view over the artifact directories.
//!
//! `GET /snapshots/<file>`, `GET /screenshots/<file>` and
//! `GET /recordings/<file>` map onto the matching directory under the media
//! root. Nothing else is routed and nothing is writable.

use anyhow::{Context, Result};
use axum::{routing::get_service, Router};
use std::{
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;

use crate::models::{ArtifactDirs, ArtifactKind};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub fn router(dirs: &ArtifactDirs) -> Router {
    ArtifactKind::ALL
        .into_iter()
        .fold(Router::new(), |router, kind| {
            router.nest_service(
                &format!("/{}", kind.dir_name()),
                get_service(ServeDir::new(dirs.dir(kind))),
            )
        })
}

pub struct ArtifactServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl ArtifactServer {
    /// Binds `127.0.0.1:<port>` and starts serving in the background.
    ///
    /// Fails if the port is taken; the caller treats that as a startup error.
    pub async fn bind(port: u16, dirs: &ArtifactDirs, shutdown: CancellationToken) -> Result<Self> {
        let requested = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        let listener = TcpListener::bind(requested)
            .await
            .with_context(|| format!("failed to bind artifact server on {requested}"))?;
        let addr = listener
            .local_addr()
            .context("artifact server has no local address")?;

        let app = router(dirs);
        let token = shutdown.clone();
        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(err) = served {
                log_error!("artifact server stopped with error: {err}");
            }
        });

        log_info!("Artifact server at http://{addr}/");
        Ok(Self {
            addr,
            shutdown,
            handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn shutdown(self) {
        self.shutdown.cancel();
        let mut handle = self.handle;
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await.is_err() {
            log_warn!("artifact server did not drain within {SHUTDOWN_GRACE:?}; aborting");
            handle.abort();
            let _ = handle.await;
        }
    }
}
