fn main() {
    if let Err(err) = world_happiness::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
