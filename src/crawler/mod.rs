//! Crawl engine
//!
//! This module contains the crawl orchestration logic:
//! - The FIFO frontier and the process-wide visited-set
//! - Admission control (domain confinement + allow-list + robots)
//! - Breadth-first traversal bounded by depth and a page ceiling
//! - Job lifecycle tracking through the storage layer

mod frontier;
mod orchestrator;

pub use frontier::{Frontier, FrontierEntry, VisitedSet};
pub use orchestrator::Orchestrator;
