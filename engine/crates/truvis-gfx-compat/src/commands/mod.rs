pub mod barrier;
pub mod legacy_barrier;
