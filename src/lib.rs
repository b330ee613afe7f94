pub mod balance;
pub mod config;
pub mod match_log;
pub mod names;
pub mod ranking;
pub mod roster;
pub mod scoring;
pub mod skill;
pub mod storage;
