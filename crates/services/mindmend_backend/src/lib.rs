pub mod app;
pub mod store_factory;

pub use app::build_router;
pub use store_factory::create_store;
