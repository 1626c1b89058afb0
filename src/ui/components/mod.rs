pub mod avatar;
pub mod input_bar;
pub mod nav_bar;
