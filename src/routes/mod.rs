mod health_check;
mod lead;
mod proposal;

pub use health_check::*;
pub use lead::*;
pub use proposal::*;
