//! # Vitrina Engine
//!
//! The core of a small product catalogue: an inventory state engine, a
//! filter and sort pipeline, a persistence adapter and a carousel
//! navigation controller.
//!
//! ## Design Principles
//!
//! - **Host owns IO**: storage and timers are traits the host implements
//! - **Synchronous transitions**: every command is applied completely before
//!   the next one is accepted
//! - **Derived views**: the filtered list is recomputed, never edited
//! - **Portable**: the crate also builds as a C library (see [`ffi`])
//!
//! ## Core Concepts
//!
//! ### Products
//!
//! A [`Product`] has a numeric `codigo`, a `nombre`, an optional description
//! and image, a stock `cantidad` and a `creacion` timestamp stamped by the
//! engine. Callers submit a [`ProductInput`] and never choose `creacion`.
//!
//! ### Commands
//!
//! Changes are expressed as [`Command`]s dispatched to an [`Inventory`]:
//! - [`Command::AddProduct`] - append a product
//! - [`Command::DeleteProduct`] - remove every product with a `codigo`
//! - [`Command::SetSearch`] - replace the search term
//! - [`Command::SetSort`] - change or toggle the sort option
//!
//! ### Filter and Sort
//!
//! [`filter_and_sort`] is a pure function from the canonical collection,
//! search term and [`SortOption`] to the visible list. It runs after every
//! command.
//!
//! ### Persistence
//!
//! [`ProductStorage`] writes the collection as JSON under
//! [`STORAGE_KEY`] in any [`KeyValueStore`]. Loads never fail: a missing or
//! corrupt record yields an empty collection.
//!
//! ### Carousel
//!
//! [`CarouselController`] tracks which window of a list is visible and
//! reacts to autoplay, keys, buttons and drags. Timers are requested from a
//! [`Scheduler`] and identified by [`TimerToken`].
//!
//! ## Quick Start
//!
//! ```rust
//! use vitrina_engine::{
//!     Command, FixedClock, Inventory, MemoryStore, ProductInput, SortField,
//! };
//!
//! let mut inventory = Inventory::open(MemoryStore::new())
//!     .with_clock(FixedClock::from_millis(1_714_557_600_000));
//!
//! inventory.add(ProductInput::new(1, "Widget", 5)).unwrap();
//! inventory.add(ProductInput::new(2, "Gadget", 0)).unwrap();
//!
//! inventory.dispatch(Command::search("wid")).unwrap();
//! assert_eq!(inventory.filtered_products().len(), 1);
//!
//! inventory.set_search_term("");
//! inventory.set_sort(SortField::Nombre, None);
//! let names: Vec<_> = inventory
//!     .filtered_products()
//!     .iter()
//!     .map(|p| p.nombre.as_str())
//!     .collect();
//! assert_eq!(names, vec!["Gadget", "Widget"]);
//! ```

pub mod carousel;
pub mod clock;
pub mod command;
pub mod error;
pub mod ffi;
pub mod inventory;
pub mod product;
pub mod query;
pub mod snapshot;
pub mod storage;
pub mod timer;

// Re-export main types at crate root
pub use carousel::{
    CarouselConfig, CarouselController, CarouselEvent, CarouselState, DragOrigin, Key,
    ViewportClass, DEFAULT_AUTOPLAY_SPEED_MS, DRAG_MULTIPLIER,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use command::Command;
pub use error::Error;
pub use inventory::{DuplicatePolicy, Inventory, InventoryState, Transition};
pub use product::{Product, ProductInput};
pub use query::{compare_names, filter_and_sort, SortDirection, SortField, SortOption};
pub use snapshot::{STORAGE_FORMAT_VERSION, STORAGE_KEY};
pub use storage::{FileStore, KeyValueStore, MemoryStore, ProductStorage};
pub use timer::{ManualScheduler, Scheduler, TimerToken};

/// Type aliases for clarity
pub type Codigo = u32;
pub type Cantidad = u32;
pub type Timestamp = chrono::DateTime<chrono::Utc>;
