fn main() {
    if let Err(e) = almanac::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
