pub mod move_map;
