// this_file: crates/fontweave-engine/src/lib.rs

//! Override resolution and fallback stacks for fontweave.
//!
//! Styles live in a [`FontStore`]. Language-scoped edits fork fonts
//! copy-on-write ([`fork`]), settings resolve through parent links
//! ([`resolve`]), and [`stack`] orders the fonts a language renders with.

pub mod cached;
pub mod coverage;
pub mod fork;
pub mod legacy;
pub mod migrate;
pub mod resolve;
pub mod sharing;
pub mod snapshot;
pub mod stack;
pub mod store;
pub mod validate;

pub use cached::CachedResolver;
pub use coverage::{font_for_char, segment_by_coverage, CoverageHit};
pub use fork::{
    add_font, add_language_font, link_fallback, map_language_to_font, remove_font,
    set_system_fallback, unmap_font, unmap_language, update_scoped_setting, AddOutcome,
    ForkOutcome, RemoveOutcome, UnmapOutcome,
};
pub use migrate::{set_primary_font, PrimarySwap};
pub use resolve::{effective_settings, system_fallback_settings};
pub use sharing::{is_root_mapped, is_shared, resolve_mapping, Mapping};
pub use snapshot::{rehydrate, LoadReport, Snapshot, SNAPSHOT_VERSION};
pub use stack::{build_stack, claimed_fonts, primary_for};
pub use store::FontStore;
pub use validate::{validate, validate_snapshot, DanglingOverride, OverrideKind, ValidationReport};
