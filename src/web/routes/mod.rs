pub mod import_routes;
pub mod page_routes;
pub mod pod_routes;
pub mod vps_routes;

pub use page_routes::page_router;
pub use pod_routes::create_pods_router;
pub use vps_routes::vps_router;
