pub mod controller;
pub mod edge_flash;
pub mod indicator;
pub mod switcher;
pub mod toast;
