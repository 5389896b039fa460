#![allow(dead_code)]

pub mod churnlens_env;
pub mod corpus;
