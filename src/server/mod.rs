pub mod routes;
pub mod runtime;

pub use runtime::{get_local_ip, service_url, start_server, RunningServer};
