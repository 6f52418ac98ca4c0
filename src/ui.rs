pub mod animation;
pub mod compositor;
pub mod edge_flash;
pub mod indicator;
pub mod surface;
pub mod switcher;
pub mod toast;
