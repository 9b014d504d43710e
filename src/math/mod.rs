//! Numeric support: the scalar/SIMD lane abstraction, generic vectors,
//! and the deterministic per-pixel random stream.

pub mod random;
pub mod simd;
pub mod vector;
