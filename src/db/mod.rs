pub mod owner;
pub mod pool;

pub use owner::owner_from_request;
pub use pool::create_pool;
