//! A packed, optionally growable bitfield.
//!
//! Bits are stored eight to a byte, most-significant-bit first, so the raw
//! buffer can be handed to peers or persisted as-is and later rebuilt with
//! [`Bitfield::from_bytes`].
//!
//! ```
//! use bitfield::{Bitfield, Growth};
//!
//! let mut have = Bitfield::with_options(0, Growth::Bounded(50));
//! have.set(55, true);
//! have.set(56, true);
//! assert!(have.get(55));
//! assert!(!have.get(56));
//! assert_eq!(have.as_bytes().len(), 7);
//! ```

pub mod bitfield;
pub mod error;
pub mod growth;

pub use crate::bitfield::{Bitfield, Iter};
pub use crate::error::{Error, Result};
pub use crate::growth::{Growth, Options};
