//! Nudger Registry: vertical profiles and model sanitization
//!
//! Every vertical (tv, washing machines, ...) carries its own rules for
//! turning crawled brand-model strings into canonical identifiers. Profiles
//! are plain configuration values collected in an explicit
//! [`VerticalRegistry`], which compiles them into [`ModelSanitizer`]s handed
//! to the referentiel builder.
//!
//! # Example
//!
//! ```
//! use nudger_registry::{VerticalRegistry, VerticalProfile};
//!
//! let mut registry = VerticalRegistry::new();
//! registry.register(VerticalProfile::generic("tv"));
//!
//! let sanitizer = registry.sanitizer_for("tv").unwrap();
//! assert_eq!(sanitizer.sanitize_model(" KV1234 "), Some("KV1234".to_string()));
//! ```

pub mod profile;
pub mod sanitizer;
pub mod vertical_registry;

pub use profile::{ModelParser, VerticalProfile};
pub use sanitizer::ModelSanitizer;
pub use vertical_registry::VerticalRegistry;
