mod common;
mod properties;
mod scenarios;
