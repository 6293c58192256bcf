use std::ffi::OsString;

fn main() {
    let args: Vec<OsString> = std::env::args_os().collect();
    if let Err(err) = freshmath_core::run(args) {
        eprintln!("freshmath: {err:#}");
        std::process::exit(1);
    }
}
