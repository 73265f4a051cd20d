mod common;
mod form;
mod identity;
mod plan;
