pub mod delivery_provider;
pub mod identity_resolver;
