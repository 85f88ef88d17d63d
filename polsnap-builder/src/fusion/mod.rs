// Fusion - combining fresh results with the previous snapshot

pub mod sticky_merge;
