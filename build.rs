//! Linker scripts for the STM32F405 image. `memory.x` comes from
//! embassy-stm32's `memory-x` feature.

fn main() {
    let target = std::env::var("TARGET").unwrap_or_default();
    if !target.starts_with("thumbv7em") {
        return;
    }

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
