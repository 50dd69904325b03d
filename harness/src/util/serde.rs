use std::{fs::File, path::Path};

use serde::de::DeserializeOwned;

pub fn deserialize_from_json_file<T: DeserializeOwned>(file: &Path) -> Result<T, String> {
    let file = File::open(file).map_err(|e| e.to_string())?;
    serde_json::from_reader(file).map_err(|e| e.to_string())
}
