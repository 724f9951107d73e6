#![allow(dead_code)]

pub mod product;
pub mod recorder;
