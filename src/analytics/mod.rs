pub mod alerts;
pub mod costs;
pub mod episodes;

pub use alerts::*;
pub use costs::*;
pub use episodes::*;
