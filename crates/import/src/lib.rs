pub mod sheet;

pub use sheet::{SheetError, SplitSheet};
