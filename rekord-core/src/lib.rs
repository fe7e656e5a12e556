//! Declarative record types.
//!
//! A record type is built from an ordered list of field declarations and a
//! handful of generation options. Building resolves inheritance and checks
//! the declarations once; the resulting [`record::RecordType`] then provides
//! construction, representation, comparison, hashing and, for frozen
//! records, a mutation guard.
//!
//! ```
//! use rekord_core::field::FieldDecl;
//! use rekord_core::record::{Arguments, RecordBuilder};
//!
//! let point = RecordBuilder::new("Point")
//!     .field(FieldDecl::new("x", "int"))
//!     .field(FieldDecl::new("y", "int").with_default(0))
//!     .frozen(true)
//!     .build()?;
//! let p = point.construct(Arguments::new().arg(1))?;
//! assert_eq!(p.repr(), "Point(x=1, y=0)");
//! assert!(p.try_hash().is_ok());
//! # Ok::<(), rekord_core::error::RecordError>(())
//! ```

pub mod data;
pub mod error;
pub mod field;
pub mod json;
pub mod record;

pub use data::Value;
pub use error::{ConfigurationError, FrozenInstanceError, RecordError};
pub use field::{Factory, FieldDecl};
pub use record::{Arguments, Instance, RecordBuilder, RecordOptions, RecordType};
