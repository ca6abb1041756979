use std::fs;

use modelsmith_core::{BuildError, BuildOptions, CacheLevel};

#[test]
fn options_load_from_toml_file() {
    let path = std::env::temp_dir().join(format!("modelsmith-options-{}.toml", std::process::id()));
    fs::write(
        &path,
        "seed = 11\nmax_depth = 8\nreuse_circular_references = false\ncache_level = \"none\"\n",
    )
    .expect("write options");

    let options = BuildOptions::load(&path).expect("load");
    let _ = fs::remove_file(&path);

    assert_eq!(options.seed, Some(11));
    assert_eq!(options.max_depth, 8);
    assert!(!options.reuse_circular_references);
    assert_eq!(options.cache_level, CacheLevel::None);
    assert_eq!(options.min_collection_len, 1);
}

#[test]
fn missing_options_file_is_io_error() {
    let result = BuildOptions::load("/definitely/not/here/modelsmith.toml");
    assert!(matches!(result, Err(BuildError::Io(_))));
}

#[test]
fn options_json_schema_lists_every_field() {
    let schema = serde_json::to_value(BuildOptions::json_schema()).expect("schema json");
    let properties = schema["properties"].as_object().expect("properties");

    for field in [
        "seed",
        "max_depth",
        "reuse_circular_references",
        "min_collection_len",
        "max_collection_len",
        "cache_level",
    ] {
        assert!(properties.contains_key(field), "missing {field}");
    }
}
