//! Reverse DNS for the display-server bypass.

use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

/// Maps a peer address to a hostname.
///
/// Returning `None` means "no match": the gateway never grants a bypass on
/// lookup failure.
pub trait ReverseResolver {
    /// Looks up the hostname for `addr`.
    fn reverse_lookup(&self, addr: IpAddr) -> Option<String>;
}

impl<T: ReverseResolver + ?Sized> ReverseResolver for &T {
    fn reverse_lookup(&self, addr: IpAddr) -> Option<String> {
        (**self).reverse_lookup(addr)
    }
}

/// Reverse lookups that may run at once unless configured otherwise.
pub const DEFAULT_MAX_DNS_LOOKUPS: usize = 8;

/// PTR lookup through the system resolver, bounded by a timeout.
///
/// The lookup runs on a helper thread; when the timeout elapses first the
/// result is discarded and the address is treated as unknown. The helper
/// thread keeps running until the system resolver returns, so the number of
/// live lookups is capped: once `max_in_flight` threads are busy, further
/// lookups fail closed without starting a thread. Clones share the cap.
#[derive(Debug, Clone)]
pub struct SystemResolver {
    timeout: Duration,
    limit: LookupLimit,
}

impl SystemResolver {
    /// Creates a resolver that gives up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            limit: LookupLimit::new(DEFAULT_MAX_DNS_LOOKUPS),
        }
    }

    /// Sets how many lookup threads may be alive at once.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.limit = LookupLimit::new(max_in_flight);
        self
    }

    /// Returns the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the cap on concurrent lookup threads.
    pub fn max_in_flight(&self) -> usize {
        self.limit.max
    }

    /// Returns the number of lookup threads still running, including those
    /// whose caller already gave up.
    pub fn in_flight(&self) -> usize {
        self.limit.in_flight.load(Ordering::Acquire)
    }

    fn lookup_with<F>(&self, addr: IpAddr, lookup: F) -> Option<String>
    where
        F: FnOnce(&IpAddr) -> io::Result<String> + Send + 'static,
    {
        let Some(permit) = self.limit.acquire() else {
            tracing::warn!(
                %addr,
                max_in_flight = self.limit.max,
                "Too many reverse DNS lookups in flight"
            );
            return None;
        };

        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("reverse-dns".to_string())
            .spawn(move || {
                let result = lookup(&addr);
                drop(permit);
                // Receiver may be gone after a timeout
                let _ = tx.send(result);
            });
        if let Err(err) = spawned {
            tracing::warn!(%addr, error = %err, "Could not start reverse DNS lookup");
            return None;
        }

        match rx.recv_timeout(self.timeout) {
            // getnameinfo falls back to the numeric form when there is no PTR record
            Ok(Ok(host)) if host.parse::<IpAddr>().is_ok() => {
                tracing::debug!(%addr, "No PTR record for peer");
                None
            }
            Ok(Ok(host)) => Some(host),
            Ok(Err(err)) => {
                tracing::debug!(%addr, error = %err, "Reverse DNS lookup failed");
                None
            }
            Err(_) => {
                tracing::debug!(
                    %addr,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Reverse DNS lookup timed out"
                );
                None
            }
        }
    }
}

impl ReverseResolver for SystemResolver {
    fn reverse_lookup(&self, addr: IpAddr) -> Option<String> {
        self.lookup_with(addr, dns_lookup::lookup_addr)
    }
}

#[derive(Debug, Clone)]
struct LookupLimit {
    in_flight: Arc<AtomicUsize>,
    max: usize,
}

impl LookupLimit {
    fn new(max: usize) -> Self {
        Self {
            in_flight: Arc::new(AtomicUsize::new(0)),
            max,
        }
    }

    fn acquire(&self) -> Option<LookupPermit> {
        self.in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max).then_some(n + 1)
            })
            .ok()
            .map(|_| LookupPermit(Arc::clone(&self.in_flight)))
    }
}

/// Held by a lookup thread; releases its slot when the thread ends.
struct LookupPermit(Arc<AtomicUsize>);

impl Drop for LookupPermit {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::Mutex;
    use std::time::Instant;

    use super::*;

    struct Fixed(Option<&'static str>);

    impl ReverseResolver for Fixed {
        fn reverse_lookup(&self, _addr: IpAddr) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    fn lookup_with(resolver: impl ReverseResolver) -> Option<String> {
        resolver.reverse_lookup("10.0.0.1".parse().unwrap())
    }

    #[test]
    fn borrowed_resolver_delegates() {
        let resolver = Fixed(Some("trusted.example.org"));
        assert_eq!(lookup_with(&resolver), Some("trusted.example.org".to_string()));
        assert_eq!(lookup_with(&Fixed(None)), None);
    }

    #[test]
    fn system_resolver_keeps_timeout() {
        let resolver = SystemResolver::new(Duration::from_millis(250));
        assert_eq!(resolver.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn system_resolver_defaults_cap() {
        let resolver = SystemResolver::new(Duration::from_millis(250));
        assert_eq!(resolver.max_in_flight(), DEFAULT_MAX_DNS_LOOKUPS);
        assert_eq!(resolver.with_max_in_flight(3).max_in_flight(), 3);
    }

    #[test]
    fn system_resolver_caps_lookups_in_flight() {
        let addr: IpAddr = "192.0.2.1".parse().unwrap();
        let resolver = SystemResolver::new(Duration::from_millis(100)).with_max_in_flight(2);
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Arc::new(Mutex::new(release_rx));

        let blocking = || {
            let release = Arc::clone(&release_rx);
            move |_: &IpAddr| -> io::Result<String> {
                // Blocks until the sender is dropped
                let _ = release.lock().unwrap().recv();
                Ok("late.example.org".to_string())
            }
        };

        assert_eq!(resolver.lookup_with(addr, blocking()), None);
        assert_eq!(resolver.lookup_with(addr, blocking()), None);
        assert_eq!(resolver.in_flight(), 2);

        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let refused = resolver.clone().lookup_with(addr, move |_: &IpAddr| {
            flag.store(true, Ordering::SeqCst);
            Ok("display.example.org".to_string())
        });
        assert_eq!(refused, None);
        assert!(!ran.load(Ordering::SeqCst));

        drop(release_tx);
        let deadline = Instant::now() + Duration::from_secs(5);
        while resolver.in_flight() > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(resolver.in_flight(), 0);

        let host = resolver.lookup_with(addr, |_: &IpAddr| Ok("display.example.org".to_string()));
        assert_eq!(host.as_deref(), Some("display.example.org"));
        assert_eq!(resolver.in_flight(), 0);
    }

    #[test]
    fn failed_lookup_releases_slot() {
        let addr: IpAddr = "192.0.2.1".parse().unwrap();
        let resolver = SystemResolver::new(Duration::from_secs(5)).with_max_in_flight(1);

        let host = resolver.lookup_with(addr, |_: &IpAddr| {
            Err(io::Error::new(io::ErrorKind::Other, "no PTR"))
        });
        assert_eq!(host, None);

        let host = resolver.lookup_with(addr, |_: &IpAddr| Ok("display.example.org".to_string()));
        assert_eq!(host.as_deref(), Some("display.example.org"));
    }

    #[test]
    fn system_resolver_never_returns_numeric_host() {
        // Either a real PTR name, or nothing; never the address echoed back
        let resolver = SystemResolver::new(Duration::from_millis(500));
        let host = resolver.reverse_lookup("192.0.2.1".parse().unwrap());

        if let Some(host) = host {
            assert!(host.parse::<IpAddr>().is_err());
        }
    }
}
