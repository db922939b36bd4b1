/// State management module
///
/// This module handles all review state, including:
/// - Image catalog and mask pairing (catalog.rs)
/// - Shared data structures (data.rs)
/// - The persisted accept/reject ledger (ledger.rs)
/// - Navigation cursor and blend weight of the open session (session.rs)
pub mod catalog;
pub mod data;
pub mod ledger;
pub mod session;
