mod error;
mod gateway;

pub use error::RepositoryError;
pub use gateway::{GatewayConfigService, GatewayRepository, GatewayRepositoryTrait};
