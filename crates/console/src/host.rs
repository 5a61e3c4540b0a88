use std::sync::Arc;

/// Opaque interactive command host bound to a console by the embedding
/// application (a shell or script-engine front end).
pub trait CommandHost: Send + Sync {
    /// Stable host name, unique per provider.
    fn name(&self) -> &str;
}

/// Factory for [`CommandHost`]s, registered with the console provider under
/// a stable name.
pub trait HostProvider: Send + Sync {
    /// Name used to select this provider.
    fn host_name(&self) -> &str;

    /// Create a host instance. `async_mode` requests a host that executes
    /// commands without blocking its caller.
    fn create_host(&self, async_mode: bool) -> Arc<dyn CommandHost>;
}
