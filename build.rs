fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // ESP-IDF link arguments are only needed for the on-device firmware.
    // Host builds (library + tests) skip the embuild environment entirely.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
