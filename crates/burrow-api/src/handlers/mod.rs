pub mod maze;

pub use maze::core_routes;
