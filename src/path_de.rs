use anyhow::anyhow;
use serde::de::DeserializeOwned;

/// Deserialize JSON, reporting the failing JSON path on error.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> anyhow::Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        anyhow!("at JSON path {path}: {}", err.into_inner())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::ClassInfo;

    #[test]
    fn reports_path_of_bad_field() {
        let err = from_str_with_path::<Vec<ClassInfo>>(r#"[{"name": "A"}, {"name": "B", "kind": "struct"}]"#)
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("at JSON path [1].kind:"), "{err}");
    }
}
