//! Actor-based monitoring core
//!
//! The monitor runs as an independent async task owning all mutable session
//! state. Everything else talks to it through channels.
//!
//! ## Architecture Overview
//!
//! ```text
//!                  ┌─────────────────┐
//!                  │   Hub (main)    │
//!                  └────────┬────────┘
//!                           │ spawns
//!                  ┌────────▼────────┐   commands (mpsc)
//!                  │  MonitorActor   │◄──────────────────── MonitorHandle
//!                  │  sample → score │
//!                  │  → evaluate     │───► SessionSnapshot (RwLock, clone-out)
//!                  └────────┬────────┘
//!                           │ one TelemetryEvent per tick
//!                  ┌────────▼────────┐
//!                  │ Broadcast (MPMC)│
//!                  └────────┬────────┘
//!                           │ subscribe
//!            push transports, dashboards, tests
//! ```
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: mpsc channel for control messages (select project, tick now, shutdown)
//! 2. **Events**: per-tick telemetry fan-out over a broadcast channel
//! 3. **Request/Response**: oneshot channels for command acknowledgements

pub mod messages;
pub mod monitor;
