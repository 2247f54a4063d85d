#[macro_use]
extern crate rocket;

pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod rest;
pub mod workflows;
