pub mod fs;

pub use fs::FileStorage;
