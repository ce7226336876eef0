/// Server services
pub mod bucket_archive;
pub mod pipeline;

pub use bucket_archive::BucketArchive;
pub use pipeline::Backends;
