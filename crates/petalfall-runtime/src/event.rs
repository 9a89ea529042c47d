//! Lifecycle events emitted by the simulation

/// Signals the simulation raises for its host
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// The detachment schedule ran dry; every petal has left the tree
    AllPetalsDetached,
    /// The post-detachment delay elapsed; the host should close with a fade
    ShutdownRequested { fade_seconds: f32 },
}
