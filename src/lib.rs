pub mod acquire;
pub mod analyzer;
pub mod cli;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod github;
pub mod identity;
pub mod merge;
pub mod model;
pub mod scan;
pub mod util;
pub mod workspace;
