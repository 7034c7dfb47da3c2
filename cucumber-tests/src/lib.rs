//! Cucumber scenarios for the SiteGuard permission engine

pub mod features;
