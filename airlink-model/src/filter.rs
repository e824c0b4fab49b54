//! SSID filter chain.
//!
//! A scan result survives filtering when the chain is empty or when any
//! single filter accepts it. The chain is a union of acceptors, not a
//! pipeline: order has no effect on the outcome.

/// Predicate over an SSID. Returning `true` keeps the record, `false`
/// drops it (subject to the OR semantics of [`FilterChain`]).
pub trait SsidFilter: Send + Sync {
    fn keep(&self, ssid: &str) -> bool;
}

impl<F> SsidFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn keep(&self, ssid: &str) -> bool {
        self(ssid)
    }
}

/// Ordered collection of independent SSID predicates.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn SsidFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        FilterChain::default()
    }

    pub fn push(&mut self, filter: impl SsidFilter + 'static) {
        self.filters.push(Box::new(filter));
    }

    pub fn with(mut self, filter: impl SsidFilter + 'static) -> Self {
        self.push(filter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// An empty chain keeps everything; otherwise any accepting filter
    /// is sufficient.
    pub fn keep(&self, ssid: &str) -> bool {
        self.filters.is_empty() || self.filters.iter().any(|f| f.keep(ssid))
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.filters.len())
            .finish()
    }
}
