// File I/O operations

pub mod range;
pub mod sheet;

pub use range::{CellRange, RangeError};
pub use sheet::{Sheet, SheetError};
