mod alert;
mod name_entry;
mod render;
mod waiting_room;

pub use render::render;
