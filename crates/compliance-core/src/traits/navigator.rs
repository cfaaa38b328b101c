//! Navigation seam.

/// Moves the client to a route.
///
/// Navigating to the route that is already current must be a no-op.
pub trait Navigator: Send + Sync + std::fmt::Debug + 'static {
    /// Navigate to `route`.
    fn navigate(&self, route: &str);

    /// The route currently shown, if any.
    fn current_route(&self) -> Option<String>;
}
