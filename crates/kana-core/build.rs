fn main() {
    println!("cargo:rerun-if-changed=src/default_settings.toml");

    let path = "src/default_settings.toml";
    let value: toml::Value = match include_str!("src/default_settings.toml").parse() {
        Ok(v) => v,
        Err(e) => panic!("{path} contains invalid TOML: {e}"),
    };
    for section in ["compile", "source", "prefix"] {
        if !value.get(section).is_some_and(toml::Value::is_table) {
            panic!("{path} is missing the [{section}] table");
        }
    }
}
