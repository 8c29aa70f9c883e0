pub mod range;

pub use range::{RangeSensor, RangeTask};
