//! Small ports shared by the pipeline services.

pub mod hash;
