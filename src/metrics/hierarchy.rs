use super::window::SampleWindow;

/// Route → method → status buckets, each leaf a [`SampleWindow`].
///
/// Levels are `Vec`-backed: cardinality is bounded by the route table, so
/// a linear probe beats hashing and keeps first-creation order, which is
/// what makes repeated renders emit lines in a stable order. Mutation is
/// serialized by the aggregator's lock, so get-or-create can never race
/// two windows into existence for one tuple.
#[derive(Debug, Default)]
pub struct BucketHierarchy {
    routes: Vec<RouteBuckets>,
}

#[derive(Debug)]
pub struct RouteBuckets {
    route: String,
    methods: Vec<MethodBuckets>,
}

#[derive(Debug)]
pub struct MethodBuckets {
    method: String,
    statuses: Vec<StatusBucket>,
}

#[derive(Debug)]
pub struct StatusBucket {
    status: u16,
    window: SampleWindow,
}

impl BucketHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the unique window for `(route, method, status)`, creating
    /// any missing level on the way down.
    pub fn get_or_create(
        &mut self,
        route: &str,
        method: &str,
        status: u16,
    ) -> &mut SampleWindow {
        let route_idx = match self.routes.iter().position(|r| r.route == route) {
            Some(idx) => idx,
            None => {
                self.routes.push(RouteBuckets {
                    route: route.to_owned(),
                    methods: Vec::new(),
                });
                self.routes.len() - 1
            }
        };
        let route_level = &mut self.routes[route_idx];

        let method_idx = match route_level
            .methods
            .iter()
            .position(|m| m.method == method)
        {
            Some(idx) => idx,
            None => {
                route_level.methods.push(MethodBuckets {
                    method: method.to_owned(),
                    statuses: Vec::new(),
                });
                route_level.methods.len() - 1
            }
        };
        let method_level = &mut route_level.methods[method_idx];

        let status_idx = match method_level
            .statuses
            .iter()
            .position(|s| s.status == status)
        {
            Some(idx) => idx,
            None => {
                method_level.statuses.push(StatusBucket {
                    status,
                    window: SampleWindow::new(),
                });
                method_level.statuses.len() - 1
            }
        };

        &mut method_level.statuses[status_idx].window
    }

    /// Routes in first-creation order.
    pub fn routes_mut(&mut self) -> impl Iterator<Item = &mut RouteBuckets> {
        self.routes.iter_mut()
    }
}

impl RouteBuckets {
    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn methods_mut(&mut self) -> impl Iterator<Item = &mut MethodBuckets> {
        self.methods.iter_mut()
    }
}

impl MethodBuckets {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn statuses_mut(&mut self) -> impl Iterator<Item = &mut StatusBucket> {
        self.statuses.iter_mut()
    }
}

impl StatusBucket {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn window_mut(&mut self) -> &mut SampleWindow {
        &mut self.window
    }
}
