//! Eyestream Runtime
//!
//! Wires ingestion, detection and publishing into one synchronous loop:
//! - [`EngineSession`]: receive, classify, publish, update the marker, draw
//! - [`CancellationToken`]: cooperative shutdown, Ctrl-C aware
//! - [`SceneProxy`]: the externally owned gaze marker
//! - [`DiagnosticOverlay`]: best-effort annotated frame display

pub mod cancel;
pub mod overlay;
pub mod scene;
pub mod session;

pub use cancel::CancellationToken;
pub use overlay::{DiagnosticOverlay, FrameDisplay, NullDisplay, SnapshotDisplay};
#[cfg(feature = "window")]
pub use overlay::WindowDisplay;
pub use scene::{GazeMarker, InMemoryScene, SceneProxy};
pub use session::{EngineSession, SessionStats, StopReason};
