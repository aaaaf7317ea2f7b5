//! Route-keyed accounting for in-flight connections.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use url::Url;

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Route {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Route {
    fn of(url: &Url) -> Self {
        Self {
            scheme: url.scheme().to_string(),
            host: url.host_str().unwrap_or_default().to_string(),
            port: url.port_or_known_default(),
        }
    }
}

#[derive(Debug, Default)]
struct Occupancy {
    total: usize,
    per_route: HashMap<Route, usize>,
}

/// Caps concurrent in-flight requests per route (scheme+host+port) and
/// overall. Checkout blocks the calling thread until a slot frees or the
/// wait bound elapses.
#[derive(Debug)]
pub(crate) struct RoutePool {
    max_per_route: usize,
    max_total: usize,
    occupancy: Mutex<Occupancy>,
    released: Condvar,
}

impl RoutePool {
    pub(crate) fn new(max_per_route: usize, max_total: usize) -> Self {
        Self {
            max_per_route,
            max_total,
            occupancy: Mutex::new(Occupancy::default()),
            released: Condvar::new(),
        }
    }

    /// Claim a slot for the request's route, waiting up to `wait`.
    pub(crate) fn checkout(
        &self,
        url: &Url,
        wait: Duration,
    ) -> std::result::Result<RoutePermit<'_>, Error> {
        let route = Route::of(url);
        let deadline = Instant::now() + wait;
        let mut occupancy = self.occupancy.lock();
        loop {
            let route_count = occupancy.per_route.get(&route).copied().unwrap_or(0);
            if occupancy.total < self.max_total && route_count < self.max_per_route {
                occupancy.total += 1;
                *occupancy.per_route.entry(route.clone()).or_insert(0) += 1;
                return Ok(RoutePermit { pool: self, route });
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(Error::PoolTimeout(wait));
            }
            let _ = self.released.wait_for(&mut occupancy, deadline - now);
        }
    }

    fn release(&self, route: &Route) {
        let mut occupancy = self.occupancy.lock();
        occupancy.total = occupancy.total.saturating_sub(1);
        if let Some(count) = occupancy.per_route.get_mut(route) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                occupancy.per_route.remove(route);
            }
        }
        drop(occupancy);
        self.released.notify_all();
    }
}

/// Claim on one connection slot; released on drop.
#[derive(Debug)]
pub(crate) struct RoutePermit<'a> {
    pool: &'a RoutePool,
    route: Route,
}

impl Drop for RoutePermit<'_> {
    fn drop(&mut self) {
        self.pool.release(&self.route);
    }
}
