pub mod simulate;
pub mod suggest;
