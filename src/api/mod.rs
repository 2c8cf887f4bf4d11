// Service API wrappers over the generic HTTP client

pub mod consul;
pub mod nomad;
pub mod onepassword;

pub use consul::ConsulApi;
pub use nomad::NomadApi;
pub use onepassword::ConnectApi;
