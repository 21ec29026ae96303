pub mod bot;
pub mod config;
pub mod driver;
pub mod error;
pub mod format;
pub mod measure;
pub mod publish;
pub mod speed;
pub mod template;

pub use bot::{Bot, CycleOutcome};
pub use config::Config;
pub use driver::Driver;
pub use error::{BotError, LoopAction, MeasurementError, PublishError};
pub use speed::Speed;
