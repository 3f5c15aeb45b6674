//! Enforcement: periodic audits of the learned pattern catalog.

pub mod audit;
