//! CLI command implementations for somanorm

mod common;
mod datasets;
mod inspect;
mod pr;
mod profile;
mod range;
mod shoulder;

pub use common::{DatasetSource, OutputFormat};
pub use datasets::datasets;
pub use inspect::inspect;
pub use pr::pr;
pub use profile::profile;
pub use range::range;
pub use shoulder::shoulder;
