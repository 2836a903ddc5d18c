//! Navigation hook for the forced sign-out.
//!
//! The coordinator doesn't know how the shell presents routes (a browser
//! location, a TUI screen stack, a log line in a headless job). When the
//! expiry countdown ends it hands the sign-in route to a [`Navigator`]
//! and lets the shell do the rest.

/// Moves the shell to a route.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → the countdown task calls it from whatever
///   worker thread it lands on, after the call that triggered expiry has
///   long returned.
///
/// # Example
///
/// Any `Fn(&str)` closure is a navigator:
///
/// ```rust
/// use registrar_session::Navigator;
///
/// let navigator = |route: &str| println!("navigating to {route}");
/// navigator.navigate("/login");
/// ```
pub trait Navigator: Send + Sync + 'static {
    /// Sends the shell to `route`. Must not block.
    fn navigate(&self, route: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn navigate(&self, route: &str) {
        self(route)
    }
}
