pub mod configuration;
pub mod delivery;
pub mod message;
pub mod server;
pub mod telemetry;
pub mod traits;
