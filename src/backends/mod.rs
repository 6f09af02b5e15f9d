//! Backend clients for the two tools
//!
//! The search path builds a fresh HTTP client on every call so ambient
//! proxy settings are honored per call; the Sheets client is constructed
//! once, with its proxy wired in explicitly, and cached for the process
//! lifetime.

pub mod sheets;
pub mod tavily;
