use leptos::prelude::*;
use move_map_canvas::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App);
}
