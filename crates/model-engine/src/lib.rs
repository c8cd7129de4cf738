pub mod mock_engine;
pub mod traits;
pub mod types;

pub use mock_engine::RecordingEngine;
pub use traits::*;
pub use types::*;
