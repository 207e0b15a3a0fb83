// this_file: src/lib.rs

//! fontweave: per-language font overrides with copy-on-write forking and
//! ordered fallback stacks.
//!
//! ```
//! use fontweave::{Font, FontId, FontStore, LanguageId, Setting, Style};
//!
//! let mut style = Style::new("body", Font::primary("P", "Inter"));
//! style.insert_font(Font::root("F1", "Noto Sans"));
//! let store = FontStore::from_styles([style]).unwrap();
//!
//! let fr = LanguageId::new("fr");
//! store
//!     .update_scoped_setting("body", &FontId::new("F1"), &fr, Setting::Scale(Some(120.0)))
//!     .unwrap();
//!
//! let style = store.get_style("body").unwrap();
//! let stack = fontweave::build_stack(&style, &fr);
//! assert_eq!(stack[0].font.as_ref().unwrap().as_str(), "F1@fr");
//! assert_eq!(stack[0].settings.scale, 120.0);
//! ```

pub use fontweave_core::*;
pub use fontweave_engine::*;

#[cfg(feature = "ttf")]
pub use fontweave_ttf::{TtfCoverage, TtfLoader};
