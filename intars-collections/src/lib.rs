//! # intars-collections
//!
//! Ordered interval collections: data structures holding one-dimensional
//! intervals over a totally ordered endpoint domain and answering stabbing
//! and range queries in O(log n + k).
//!
//! ## Design Philosophy
//!
//! All of the query structures share one interval algebra (`intars-core`) and
//! one collection contract ([`IntervalCollection`] /
//! [`MutableIntervalCollection`]), so a caller can swap implementations and a
//! single test suite can be driven across every structure. Collections hold
//! plain references to caller-owned intervals and never clone or mutate them.
//!
//! ## Main Components
//!
//! - **[`NestedContainmentList`]**: static, flat-array containment hierarchy
//! - **[`LayeredContainmentList`]**: static, parallel layer arrays joined by
//!   inter-layer pointers
//! - **[`StaticIntervalTree`]**: static median-split tree with per-node
//!   endpoint-sorted lists
//! - **[`IntervalBinarySearchTree`]**: dynamic red-black tree over endpoint
//!   keys with per-node reference sets and overlap-depth augmentation
//! - **[`DynamicIntervalTree`]**: dynamic AVL tree keyed canonically with
//!   subtree-reach pruning
//!
//! ## Example
//!
//! ```rust
//! use intars_core::models::Interval;
//! use intars_collections::{IntervalCollection, NestedContainmentList};
//!
//! let genes = vec![
//!     Interval::closed(1000, 2000).unwrap(),
//!     Interval::closed(1500, 2500).unwrap(),
//!     Interval::closed(5000, 6000).unwrap(),
//! ];
//! let index = NestedContainmentList::new(genes.iter()).unwrap();
//!
//! let query = Interval::closed(1800, 2200).unwrap();
//! assert_eq!(index.count_overlaps(&query), 2);
//! ```

pub mod dyn_tree;
pub mod gaps;
pub mod ibs_tree;
pub mod layered;
pub mod nclist;
pub mod static_tree;
pub mod traits;

mod depth;
mod util;

// re-exports
pub use self::dyn_tree::DynamicIntervalTree;
pub use self::gaps::Gaps;
pub use self::ibs_tree::IntervalBinarySearchTree;
pub use self::layered::LayeredContainmentList;
pub use self::nclist::NestedContainmentList;
pub use self::static_tree::StaticIntervalTree;
pub use self::traits::{IntervalCollection, MutableIntervalCollection};
