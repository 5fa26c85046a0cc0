//! Scheduler connection probe.
//!
//! Selecting the distributed backend requires a reachable coordinating
//! scheduler. The connection attempt returns an explicit result — connected
//! or unavailable with a reason — so the fallback to local execution is a
//! visible, testable branch rather than a swallowed failure.

use std::fmt;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// A verified connection to the coordinating scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    address: String,
    resolved: SocketAddr,
}

impl SchedulerHandle {
    /// The `host:port` string the handle was created from.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn resolved(&self) -> SocketAddr {
        self.resolved
    }
}

impl fmt::Display for SchedulerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scheduler at {}", self.address)
    }
}

/// Outcome of probing the scheduler address.
#[derive(Debug)]
pub enum SchedulerProbe {
    Connected(SchedulerHandle),
    Unavailable { reason: String },
}

impl SchedulerProbe {
    /// Attempt a TCP connection to `address` (`host:port`) within `timeout`.
    ///
    /// The stream is dropped immediately; the probe only verifies
    /// reachability at startup. There is no mid-run reconnection.
    pub fn connect(address: &str, timeout: Duration) -> SchedulerProbe {
        let resolved = match address.to_socket_addrs() {
            Ok(mut addrs) => match addrs.next() {
                Some(addr) => addr,
                None => {
                    return SchedulerProbe::Unavailable {
                        reason: format!("'{address}' resolved to no addresses"),
                    }
                }
            },
            Err(e) => {
                return SchedulerProbe::Unavailable {
                    reason: format!("cannot resolve '{address}': {e}"),
                }
            }
        };

        match TcpStream::connect_timeout(&resolved, timeout) {
            Ok(_stream) => SchedulerProbe::Connected(SchedulerHandle {
                address: address.to_string(),
                resolved,
            }),
            Err(e) => SchedulerProbe::Unavailable {
                reason: format!("cannot connect to '{address}': {e}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    const PROBE_TIMEOUT: Duration = Duration::from_millis(500);

    #[test]
    fn unresolvable_address_is_unavailable() {
        let probe = SchedulerProbe::connect("host.invalid:8786", PROBE_TIMEOUT);
        assert!(matches!(probe, SchedulerProbe::Unavailable { .. }));
    }

    #[test]
    fn refused_connection_is_unavailable() {
        // Port 9 (discard) is closed on test machines.
        let probe = SchedulerProbe::connect("127.0.0.1:9", PROBE_TIMEOUT);
        match probe {
            SchedulerProbe::Unavailable { reason } => {
                assert!(reason.contains("127.0.0.1:9"), "reason: {reason}")
            }
            SchedulerProbe::Connected(_) => panic!("expected unavailable"),
        }
    }

    #[test]
    fn listening_socket_is_connected() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let probe = SchedulerProbe::connect(&addr, PROBE_TIMEOUT);
        match probe {
            SchedulerProbe::Connected(handle) => assert_eq!(handle.address(), addr),
            SchedulerProbe::Unavailable { reason } => panic!("expected connected: {reason}"),
        }
    }
}
