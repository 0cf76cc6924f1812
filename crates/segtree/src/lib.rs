//! # segtree
//!
//! ## What it is
//!
//! segtree is a generic segment tree over a fixed closed integer domain. It
//! pre-computes and maintains aggregates across the domain and answers
//! arbitrary range queries through canonical range decomposition.
//!
//! Key features:
//!
//! * Caller-supplied aggregation through the [Aggregator] trait
//! * `O(log n)` range queries and point updates
//! * Optional lazy (deferred) range updates with a precise push-down discipline
//! * `#![no_std]` support (requires `alloc`)
//!
//! ## How it works
//!
//! The domain `[start, end]` is split recursively at its midpoint into a
//! balanced binary structure. Each node stores the aggregate of its
//! sub-interval under the aggregator's associative `combine` function, so any
//! query range decomposes into `O(log n)` canonically matching nodes.
//!
//! Range updates are deferred: an update targeting a node's exact interval is
//! folded into the node's aggregate and parked as a pending marker, which is
//! pushed down to the children the next time the node is visited. Eligibility
//! for range updates is decided at construction through [TreeConf]; aggregates
//! without an additive delta rule reject them with
//! [Error::UnsupportedOperation].
//!
//! ## Example
//!
//! ```
//! use segtree::{SegmentTree, TreeConf, aggregator::sum::U64SumAggregator};
//!
//! let conf = TreeConf::default().with_range_updates();
//! let mut tree: SegmentTree<U64SumAggregator> =
//!     SegmentTree::build_with_conf(0, 4, |i| (i + 1) as u64, conf).unwrap();
//!
//! assert_eq!(tree.query(1, 3), Ok(9));
//! tree.modify(1, 3, 10).unwrap();
//! assert_eq!(tree.query(1, 3), Ok(39));
//! assert_eq!(tree.query(0, 4), Ok(45));
//! ```
//!
//! # Feature Flags
//!
//! - `std` (_enabled by default_)
//!     - Enables features that rely on the standard library

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

use core::fmt::{self, Display};

/// Aggregation interface and built-in aggregator implementations
pub mod aggregator;
/// The segment tree, its builder and its configuration
pub mod tree;

pub use aggregator::{Aggregator, DeltaRule};
pub use tree::{Node, SegmentTree, TreeConf};

/// A type containing error variants that may arise when using a segment tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requested construction domain is empty
    InvalidRange {
        /// Requested lower bound of the domain
        start: i64,
        /// Requested upper bound of the domain
        end: i64,
    },
    /// The requested index or range falls outside the constructed domain
    OutOfRange {
        /// Requested lower bound
        start: i64,
        /// Requested upper bound
        end: i64,
        /// Lower bound of the constructed domain
        low: i64,
        /// Upper bound of the constructed domain
        high: i64,
    },
    /// A range update was requested on a tree built without a delta rule
    UnsupportedOperation,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidRange { start, end } => {
                write!(f, "invalid domain [{start}, {end}] expected start <= end")
            }
            Error::OutOfRange {
                start,
                end,
                low,
                high,
            } => {
                write!(
                    f,
                    "range [{start}, {end}] falls outside the domain [{low}, {high}]"
                )
            }
            Error::UnsupportedOperation => {
                write!(
                    f,
                    "range updates require a tree built with range updates enabled and a delta rule"
                )
            }
        }
    }
}

impl Error {
    /// Returns `true` if the error is an invalid construction domain
    pub fn is_invalid_range(&self) -> bool {
        matches!(self, Error::InvalidRange { .. })
    }
    /// Returns `true` if the error is an out-of-domain access
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Error::OutOfRange { .. })
    }
    /// Returns `true` if the error is an unsupported range update
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::UnsupportedOperation)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
