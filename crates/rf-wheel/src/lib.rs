//! # rf-wheel
//!
//! Spin resolution engine for a partitioned prize wheel.
//!
//! ## Features
//!
//! - **Exact Resolution**: Deterministic rotation → winning partition mapping
//! - **Guarded State Machine**: Overlapping spins and stray completions are no-ops
//! - **Deceleration Ticks**: Cancellable self-rescheduling click sequence
//! - **Procedural Audio**: Synthesized clicks and win chime, bounceable to WAV
//! - **Headless Driver**: Whole pipeline on a virtual clock for tests and tools
//! - **Persistence**: Partitions, players and session as JSON documents
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SpinMachine                          │
//! │   request_spin ──▶ SpinTarget ──▶ RenderSync (transition)   │
//! │        │                                   │                │
//! │        ▼                                   ▼                │
//! │  SpinScheduler ──▶ TickSink        on_animation_complete    │
//! │        │          (SoundBoard)             │                │
//! │        ▼                                   ▼                │
//! │      Timer                          resolver + layout       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use rf_wheel::{HeadlessWheel, WheelConfig};
//!
//! let mut wheel = HeadlessWheel::new(WheelConfig::normal(), rf_core::default_partitions());
//! let outcome = wheel.spin_once();
//! ```

pub mod audio;
pub mod config;
pub mod editor;
pub mod headless;
pub mod layout;
pub mod machine;
pub mod resolver;
pub mod scheduler;
pub mod scoreboard;
pub mod session;
pub mod store;
pub mod timer;
pub mod transition;

pub use audio::{AudioOutput, ClipKind, ClipRecorder, MuteFlag, NullOutput, SoundBoard, ToneClip};
pub use config::{
    AudioConfig, MIN_FULL_TURNS, PartitionSource, SpinConfig, TickConfig, TimingProfile,
    WheelConfig,
};
pub use editor::PartitionEditor;
pub use headless::HeadlessWheel;
pub use layout::{AngularSlice, label_font_size, layout};
pub use machine::{RenderSync, SpinMachine, SpinOutcome, SpinTarget, validate_offset};
pub use resolver::{normalize_degrees, pointer_degrees, resolve, resolve_index, rotation_offset_for};
pub use scheduler::{SpinScheduler, TickCurve, TickEvent, TickLog, TickSink};
pub use scoreboard::Scoreboard;
pub use session::SpinSession;
pub use store::{FileStore, KeyValueStore, MemoryStore, WheelStore};
pub use timer::{ManualTimer, ThreadTimer, Timer, TimerHandle};
pub use transition::{CubicBezier, RotationTransition, TransitionTracker};
