use std::env;
use std::fs;
use std::path::Path;

// Prefijo de las variables que lee `EngineSettings::from_env()`
const ENV_PREFIX: &str = "SCANNER_";

fn main() {
    // Pasar SCANNER_* desde .env como variables de compilación
    let env_file = Path::new(".env");

    if env_file.exists() {
        println!("cargo:rerun-if-changed=.env");

        if let Ok(contents) = fs::read_to_string(env_file) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }

                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"');

                    // El entorno real tiene prioridad sobre .env
                    if key.starts_with(ENV_PREFIX) && env::var(key).is_err() {
                        println!("cargo:rustc-env={}={}", key, value);
                    }
                }
            }
        }
    }

    for key in ["FACING_MODE", "WIDTH", "HEIGHT", "PATCH_SIZE", "FREQUENCY"] {
        println!("cargo:rerun-if-env-changed={}{}", ENV_PREFIX, key);
    }
    println!("cargo:rerun-if-changed=build.rs");
}
