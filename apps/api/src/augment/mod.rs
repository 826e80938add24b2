pub mod augmenter;
pub mod merge;
pub mod prompts;
pub mod style;

#[cfg(test)]
pub(crate) mod testing;

pub use augmenter::{augment, AugmentConfig, AugmentOptions, Augmentation, AugmentationBatch};
pub use merge::{merge, MergeReport};
pub use style::{LetterLength, Style};
