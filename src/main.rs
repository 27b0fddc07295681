fn main() {
    if let Err(e) = menu_translator_lib::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
