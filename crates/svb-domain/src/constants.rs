//! Domain layer constants

/// Property key under which a reference's interfaces are exposed to filters
pub const OBJECT_CLASS: &str = "objectClass";

/// Property key carrying a reference's registry-assigned id
pub const SERVICE_ID: &str = "service.id";
