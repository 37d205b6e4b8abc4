use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    ca_tree_mort::example_apps::run_build_dataset(std::env::args().skip(1))
}
