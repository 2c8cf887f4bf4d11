// Lookup plugins for fetching values from external stores

pub mod lookups;

pub use lookups::onepassword_connect;
