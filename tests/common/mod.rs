#![allow(dead_code)]

use bookrec::AppConfig;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const CATALOG_CSV: &str = "\
User-ID,ISBN,Book-Rating,Book-Title,Book-Author,Year-Of-Publication,Publisher,Image-URL-M
42,A,8,Harry Potter and the Philosopher's Stone,J. K. Rowling,1997,Bloomsbury,http://images.example.com/A.jpg
42,B,6,The Hobbit,J. R. R. Tolkien,1937,Allen & Unwin,http://images.example.com/B.jpg
7,C,0.2,Where the Wild Things Are,Maurice Sendak,1963,Harper,
7,D,0.8,Harry Potter and the Chamber of Secrets,J. K. Rowling,1998,Bloomsbury,http://images.example.com/D.jpg
7,E,0.3,Dune,Frank Herbert,1965,Chilton,http://images.example.com/E.jpg
13,E,9,Dune,Frank Herbert,1965,Chilton,http://images.example.com/E.jpg
";

/// Item biases reproduce predictor A scores C=0.9, D=0.5, E=0.1 for user 42.
pub const FACTOR_JSON: &str = r#"{
    "global_mean": 0.0,
    "rating_scale": [0.0, 10.0],
    "users": {
        "42": {"bias": 0.0, "factors": [0.0]},
        "7": {"bias": 0.0, "factors": [0.0]}
    },
    "items": {
        "A": {"bias": 0.7, "factors": [0.0]},
        "B": {"bias": 0.6, "factors": [0.0]},
        "C": {"bias": 0.9, "factors": [0.0]},
        "D": {"bias": 0.5, "factors": [0.0]},
        "E": {"bias": 0.1, "factors": [0.0]}
    }
}"#;

/// User 42 fully trusts user 7, so predictor B returns user 7's ratings.
pub const NEIGHBOR_JSON: &str = r#"{
    "k": 40,
    "min_k": 1,
    "rating_scale": [0.0, 10.0],
    "similarities": {
        "42": {"7": 1.0, "13": 0.0},
        "7": {"42": 1.0}
    }
}"#;

pub fn write_assets(dir: &Path) {
    std::fs::write(dir.join("catalog.csv"), CATALOG_CSV).unwrap();
    std::fs::write(dir.join("svd_model.json"), FACTOR_JSON).unwrap();
    std::fs::write(dir.join("knn_model.json"), NEIGHBOR_JSON).unwrap();
}

pub fn write_zip_bundle(path: &Path) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    for (name, content) in [
        ("catalog.csv", CATALOG_CSV),
        ("svd_model.json", FACTOR_JSON),
        ("knn_model.json", NEIGHBOR_JSON),
    ] {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

pub fn config_for(path: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.assets.path = path.to_str().unwrap().to_string();
    config
}

pub fn assets_dir() -> (TempDir, AppConfig) {
    let temp_dir = TempDir::new().unwrap();
    write_assets(temp_dir.path());
    let config = config_for(temp_dir.path());
    (temp_dir, config)
}
