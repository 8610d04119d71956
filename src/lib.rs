pub mod adsb;
pub mod cordic;
pub mod correlator;
pub mod costas;
pub mod error;
pub mod fixed;
pub mod iq_file;
pub mod signal;
pub mod tracing_init;

pub use cordic::{cordic_rotate, cordic_to_polar, Cordic, FixedCordic};
pub use correlator::{Correlator, CorrelatorConfig, DecodedMessage, SquitterReceiver};
pub use costas::{CarrierLoop, CostasConfig, CostasLoop, CostasOutput, FixedCostasLoop};
pub use error::ConfigError;
pub use fixed::{ArithmeticMode, ComplexSample, FixedFormat, FixedSample};
pub use signal::{generate_bpsk, BpskGenerator};
