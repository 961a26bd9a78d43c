//! Listener lifecycle: bind, serve in the background, shut down gracefully.

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use std::net::{IpAddr, SocketAddr, TcpListener, UdpSocket};
use std::time::Duration;
use tokio::task::JoinHandle;

/// A server that has bound its socket and is accepting connections.
pub struct RunningServer {
    pub port: u16,
    pub handle: Handle,
    task: JoinHandle<()>,
}

impl RunningServer {
    /// Signal shutdown, give in-flight responses `grace` to finish, and wait
    /// for the serve task to exit.
    pub async fn shutdown(self, grace: Duration) {
        self.handle.graceful_shutdown(Some(grace));
        let _ = self.task.await;
    }
}

/// Bind `addr:port` (port 0 asks the OS for a free one) and serve `app` in a
/// background task. Bind failures are fatal and reported before any request
/// is served.
pub async fn start_server(app: Router, addr: IpAddr, port: u16) -> Result<RunningServer> {
    let listener = TcpListener::bind(SocketAddr::new(addr, port)).with_context(|| {
        format!("failed to bind {addr}:{port} - is another service using this port?")
    })?;
    listener
        .set_nonblocking(true)
        .context("set listener non-blocking")?;

    let port = listener.local_addr().context("read bound address")?.port();

    let handle = Handle::new();
    let serve_handle = handle.clone();
    let task = tokio::spawn(async move {
        if let Err(e) = axum_server::from_tcp(listener)
            .handle(serve_handle)
            .serve(app.into_make_service())
            .await
        {
            tracing::error!(error = %e, "server error");
        }
    });

    Ok(RunningServer { port, handle, task })
}

/// Best-effort LAN IP discovery: route a UDP socket outward and read the
/// local address the kernel picked. No packets are sent.
pub fn get_local_ip() -> Result<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").context("bind socket for IP detection")?;
    socket
        .connect("8.8.8.8:80")
        .context("route socket for IP detection")?;
    let local_addr = socket.local_addr().context("read local address")?;
    Ok(local_addr.ip().to_string())
}

/// The URL clients visit, reported exactly once after a successful bind.
pub fn service_url(host: &str, port: u16, service_path: &str) -> String {
    format!("http://{host}:{port}{service_path}")
}
