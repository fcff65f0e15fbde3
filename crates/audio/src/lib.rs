mod audioerror;
pub use audioerror::*;

mod audiosample;
pub use audiosample::*;

mod audioout;
pub use audioout::*;

mod decode;
pub use decode::*;

#[cfg(feature = "pulse")]
mod pulse;
#[cfg(feature = "pulse")]
pub use pulse::PulseOut;
