pub mod candidate;
pub mod reference;
pub mod score;
