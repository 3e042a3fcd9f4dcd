//! Mapedit Core Library
//!
//! Edit-session orchestration for a map feature editor: point objects and
//! polygon areas, a broadcast signal bus, single-owner exclusivity, the
//! render/capture surface model and the fetch/mutate facade.
//!
//! Everything here is platform-neutral and runs natively under `cargo test`.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod bus;
pub mod editor;
pub mod error;
pub mod exclusivity;
pub mod geometry;
pub mod model;
pub mod runtime;
pub mod session;
pub mod signal;
pub mod store;
pub mod surface;

pub use bus::{SignalBus, Subscription, WeakSignalBus};
pub use editor::{ActiveEditor, Editable, Editor, FetchTicket, PendingSave, SaveOutcome, SaveTicket};
pub use error::{EditorError, Notice, NoticeLevel, StoreError, ValidationError};
pub use exclusivity::{ExclusivityController, Owner};
pub use geometry::{Bounds, Coord, PointGeometry, PolygonGeometry, Ring};
pub use model::{AreaFeature, Feature, FeatureId, FeatureKind, FeatureRecord, PointFeature, SymbolKind};
pub use runtime::{EditorHandle, SurfaceHandle};
pub use session::{EditMode, EditSession, Mutation};
pub use signal::Signal;
pub use store::FeatureStore;
pub use surface::{CameraMove, CameraTarget, Overlay, Surface, Viewport};
