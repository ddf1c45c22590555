fn main() {
    // ESP-IDF build metadata only matters for device builds; host builds
    // (tests, simulation) must not require the Xtensa toolchain.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
