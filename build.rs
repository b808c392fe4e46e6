fn main() {
    // ESP-IDF builds need the sysenv link args; host builds have nothing to do.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
