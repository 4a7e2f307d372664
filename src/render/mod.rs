pub mod canvas;
pub mod dual;
pub mod element;
pub mod frame;
pub mod surface;
