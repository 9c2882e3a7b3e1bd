pub mod browse;
pub mod recommendations;
pub mod title_resolver;

pub use browse::BrowseService;
pub use recommendations::RecommendationEngine;
pub use title_resolver::TitleResolver;
