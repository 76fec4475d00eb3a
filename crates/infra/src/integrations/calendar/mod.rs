//! Calendar synchronization gateway

pub mod gateway;

pub use gateway::CalendarSyncGateway;
