pub mod cluster_eval;
pub mod config;
pub mod dataset;
pub mod embed;
pub mod export;
pub mod features;
pub mod kmeans;
pub mod plot;
pub mod report;
pub mod standardize;
pub mod team_stats;
