pub mod latch;
pub mod nvr;
pub mod port;

pub mod prelude {
    pub use crate::latch::{read_system_status1, read_system_status2};
    pub use crate::nvr::codec::{DataMode, HourMode};
    pub use crate::nvr::{NvrBus, NvrError, NvrImage};
    pub use crate::port::{DevPort, PortIo};
}
