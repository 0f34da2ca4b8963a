// Domain layer: models, the static source registry and ports.

pub mod model;
pub mod ports;
pub mod registry;
