mod increment_u64_id;

pub use increment_u64_id::IncrementU64Id;
