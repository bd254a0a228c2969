use std::env;
use std::process::Command;

fn main() {
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());

    // Record the compiler used so `--version` can report it
    let version = Command::new(&rustc)
        .arg("-V")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| {
            eprintln!("Warning: could not run {} -V, compiler version unknown", rustc);
            "unknown".to_string()
        });

    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=NETDEV_PROBE_RUSTC_VERSION={}", version);
    println!("cargo:rustc-env=NETDEV_PROBE_TARGET={}", target);
    println!("cargo:rerun-if-changed=build.rs");
}
