//! Rebuild dj-storage whenever the embedded playlist or job queue migrations change.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
