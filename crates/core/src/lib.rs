pub mod money;
pub mod split;

pub use money::{within_limit, Money, MAX_AMOUNT};
pub use split::{allocate, Allocation, PersonTotal, SplitError, SplitLine};
