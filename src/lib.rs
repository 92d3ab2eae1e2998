pub mod bitfield;
pub mod channel;
pub mod clock;
pub mod device;
pub mod error;
pub mod table;
pub mod trace;
pub mod utils;

pub use bitfield::*;
pub use channel::*;
pub use clock::*;
pub use device::*;
pub use error::*;
pub use table::*;
pub use trace::*;
pub use utils::*;
