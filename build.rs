// build.rs

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // --- 1. Determine the language ---
    // Priority: `lang_*` feature flags, then DEVTREE_LANG, then "en".
    let mut active_langs = Vec::new();
    for (key, _) in env::vars() {
        if let Some(l) = key.strip_prefix("CARGO_FEATURE_LANG_") {
            active_langs.push(l.to_lowercase());
        }
    }
    active_langs.sort();

    let lang = match active_langs.first() {
        Some(first) => {
            if active_langs.len() > 1 {
                println!(
                    "cargo:warning=Multiple language features enabled ({:?}). Using '{}'.",
                    active_langs, first
                );
            }
            first.clone()
        }
        None => env::var("DEVTREE_LANG").unwrap_or_else(|_| "en".to_string()),
    };

    println!("cargo:rustc-env=DEVTREE_LANG_EFFECTIVE={}", lang);

    // --- 2. Rerun triggers ---
    println!("cargo:rerun-if-env-changed=DEVTREE_LANG");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=locales/");

    // --- 3. English is always loaded as the fallback ---
    let fallback_content = fs::read_to_string("locales/en.toml")
        .expect("Failed to read fallback language file: locales/en.toml");
    let mut translations: HashMap<String, String> =
        toml::from_str(&fallback_content).expect("Failed to parse locales/en.toml");

    // --- 4. Merge the requested language over the fallback ---
    if lang != "en" {
        let lang_file_path = format!("locales/{}.toml", lang);
        if let Ok(content) = fs::read_to_string(&lang_file_path) {
            let specific: HashMap<String, String> = toml::from_str(&content)
                .unwrap_or_else(|_| panic!("Failed to parse {}", lang_file_path));
            translations.extend(specific);
        } else {
            println!(
                "cargo:warning=Language file '{}' not found. Falling back to 'en'.",
                lang_file_path
            );
        }
    }

    // --- 5. Generate the `t!` macro ---
    let mut keys: Vec<_> = translations.keys().collect();
    keys.sort();

    let mut macro_code = String::from("#[macro_export]\nmacro_rules! t {\n");
    for key in keys {
        let value = &translations[key];
        let escaped_value = value.replace('\\', "\\\\").replace('"', "\\\"");
        macro_code.push_str(&format!(
            "    (\"{}\") => {{ \"{}\" }};\n",
            key, escaped_value
        ));
    }
    // Unknown keys fail at compile time.
    macro_code.push_str(
        "    ($key:expr) => {{ compile_error!(concat!(\"Missing translation key: \", $key)) }};\n",
    );
    macro_code.push('}');

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest_path = Path::new(&out_dir).join("translations.rs");
    fs::write(&dest_path, macro_code).expect("Failed to write translations.rs");
}
