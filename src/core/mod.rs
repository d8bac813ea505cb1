//! Employee and attendance operations. Each function performs one logical
//! read-modify-write against the injected [`Store`](crate::store::Store).

pub mod attendance;
pub mod employees;
