pub mod completion;
pub mod normalizer;
pub mod origin_gate;
