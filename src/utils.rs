//! Utility functions for the UAS classifier

pub mod url;
