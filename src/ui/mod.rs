pub mod console_surface;
