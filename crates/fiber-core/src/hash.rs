#[cfg(feature = "std-hash")]
pub mod default {
    pub use std::collections::hash_map::RandomState as BuildHasher;
}

#[cfg(not(feature = "std-hash"))]
pub mod default {
    pub type BuildHasher = std::hash::BuildHasherDefault<ahash::AHasher>;
}
