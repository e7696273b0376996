pub mod minilm;
pub mod modernbert;

pub use minilm::{MiniLmSize, SentenceMiniLmModel};
pub use modernbert::{ZeroShotModernBertModel, ZeroShotModernBertSize};
