pub mod move_map;
pub mod not_found;
