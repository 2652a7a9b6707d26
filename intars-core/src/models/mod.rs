pub mod bounds;
pub mod interval;

// re-export for cleaner imports
pub use self::bounds::{IntervalBounds, PointInterval};
pub use self::interval::Interval;
