//! Loading pipeline: reads data files, checks cross-references, builds the catalog.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus [`load_catalog`] and [`load_plan`] on top
//! of them.

use crate::schema::{DeviceData, ItemData, Plan, RecipeData};
use alchemy_core::catalog::{Catalog, CatalogBuilder, CatalogError, DeviceDef, ItemDef, RecipeDef};
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// The definitions parsed but do not form a valid catalog.
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// more than one format exists for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

/// The sample catalog and plans shipped with this crate.
pub fn bundled_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list from a file. For TOML files, extracts the array at the
/// given `toml_key` from a top-level table. For RON and JSON, deserializes
/// directly as `Vec<T>`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => {
            let table: toml::Value = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name in a map, returning an `UnresolvedRef` error if not found.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Check whether a name already exists in a map, returning a `DuplicateName`
/// error if so.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Index a list by name, rejecting duplicates.
fn index_names<'a, T>(
    entries: &'a [T],
    name_of: impl Fn(&T) -> &str,
    file: &Path,
) -> Result<HashMap<String, &'a T>, DataLoadError> {
    let mut map = HashMap::with_capacity(entries.len());
    for entry in entries {
        let name = name_of(entry);
        check_duplicate(&map, name, file)?;
        map.insert(name.to_string(), entry);
    }
    Ok(map)
}

// ===========================================================================
// Catalog and plan loading
// ===========================================================================

/// Load `items`, `devices` and `recipes` from `dir` and build a [`Catalog`].
///
/// Each base name must exist in exactly one of `.ron`, `.toml` or `.json`.
pub fn load_catalog(dir: &Path) -> Result<Catalog, DataLoadError> {
    let items_path = require_data_file(dir, "items")?;
    let devices_path = require_data_file(dir, "devices")?;
    let recipes_path = require_data_file(dir, "recipes")?;

    let items: Vec<ItemData> = deserialize_list(&items_path, "items")?;
    let devices: Vec<DeviceData> = deserialize_list(&devices_path, "devices")?;
    let recipes: Vec<RecipeData> = deserialize_list(&recipes_path, "recipes")?;

    let item_names = index_names(&items, |i| i.name.as_str(), &items_path)?;
    let device_names = index_names(&devices, |d| d.name.as_str(), &devices_path)?;
    index_names(&recipes, |r| r.name.as_str(), &recipes_path)?;

    for recipe in &recipes {
        resolve_name(&device_names, &recipe.device, &recipes_path, "device")?;
        let entries = std::iter::once(&recipe.output)
            .chain(&recipe.inputs)
            .chain(&recipe.byproducts);
        for entry in entries {
            resolve_name(&item_names, entry.item(), &recipes_path, "item")?;
        }
    }

    let mut builder = CatalogBuilder::new();
    for item in &items {
        let mut def = ItemDef::new(&item.name);
        def.heat_value = item.heat_value;
        def.fertilizer_potency = item.fertilizer_potency;
        def.tags = item.tags.clone();
        builder.register_item(def)?;
    }
    for device in &devices {
        let mut def = DeviceDef::new(&device.name, device.kind, device.throughput);
        def.heat = device.heat;
        def.requires_fuel = device.burns_fuel();
        def.nutrient_demand = device.nutrient_demand;
        builder.register_device(def)?;
    }
    for recipe in &recipes {
        let mut def = RecipeDef::new(
            &recipe.name,
            recipe.output.item(),
            recipe.output.quantity(),
            &recipe.device,
        );
        for input in &recipe.inputs {
            def = def.input(input.item(), input.quantity());
        }
        for byproduct in &recipe.byproducts {
            def = def.byproduct(byproduct.item(), byproduct.quantity());
        }
        def.duration = recipe.duration;
        builder.register_recipe(def)?;
    }

    let catalog = builder.build()?;
    info!(
        "loaded catalog from {}: {} items, {} devices, {} recipes",
        dir.display(),
        catalog.item_count(),
        catalog.device_count(),
        catalog.recipe_count()
    );
    Ok(catalog)
}

/// Load a plan file (targets, configuration, limits, layout options).
pub fn load_plan(path: &Path) -> Result<Plan, DataLoadError> {
    let plan: Plan = deserialize_file(path)?;
    debug!(
        "loaded plan from {}: {} targets",
        path.display(),
        plan.targets.len()
    );
    Ok(plan)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use alchemy_core::catalog::CatalogLookup;
    use alchemy_core::id::{ItemId, RecipeId};
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "alchemy_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const ITEMS_RON: &str = r#"[(name: "Sand"), (name: "Glass"), (name: "Coal", heat_value: Some(40.0))]"#;
    const DEVICES_RON: &str = r#"[(name: "Furnace", throughput: 12.0, heat: 30.0)]"#;
    const RECIPES_RON: &str =
        r#"[(name: "Melt Glass", output: ("Glass", 1.0), inputs: [("Sand", 2.0)], device: "Furnace")]"#;

    fn write_glass_catalog(dir: &Path) {
        fs::write(dir.join("items.ron"), ITEMS_RON).unwrap();
        fs::write(dir.join("devices.ron"), DEVICES_RON).unwrap();
        fs::write(dir.join("recipes.ron"), RECIPES_RON).unwrap();
    }

    // -----------------------------------------------------------------------
    // detect_format / find_data_file
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("items.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("items.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("items.json")).unwrap(), Format::Json);
        assert!(matches!(
            detect_format(Path::new("items.yaml")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("items")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn find_data_file_found_and_missing() {
        let dir = make_test_dir("find");
        assert_eq!(find_data_file(&dir, "items").unwrap(), None);
        fs::write(dir.join("items.json"), "[]").unwrap();
        assert_eq!(find_data_file(&dir, "items").unwrap(), Some(dir.join("items.json")));
        cleanup(&dir);
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("find_conflict");
        fs::write(dir.join("items.ron"), "[]").unwrap();
        fs::write(dir.join("items.json"), "[]").unwrap();

        let result = find_data_file(&dir, "items");
        assert!(matches!(
            result,
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        cleanup(&dir);
    }

    #[test]
    fn require_data_file_missing() {
        let dir = make_test_dir("require_missing");

        let result = require_data_file(&dir, "devices");
        match result {
            Err(DataLoadError::MissingRequired { file, .. }) => assert_eq!(file, "devices"),
            other => panic!("expected MissingRequired, got: {other:?}"),
        }

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // deserialize_file / deserialize_list
    // -----------------------------------------------------------------------

    #[test]
    fn deserialize_list_toml() {
        let dir = make_test_dir("list_toml");
        let path = dir.join("items.toml");
        fs::write(
            &path,
            r#"
[[items]]
name = "Water"

[[items]]
name = "Charcoal"
heat_value = 30.0
"#,
        )
        .unwrap();

        let items: Vec<ItemData> = deserialize_list(&path, "items").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].heat_value, Some(30.0));

        cleanup(&dir);
    }

    #[test]
    fn deserialize_list_toml_missing_key() {
        let dir = make_test_dir("list_toml_missing");
        let path = dir.join("items.toml");
        fs::write(&path, r#"foo = "bar""#).unwrap();

        let result: Result<Vec<ItemData>, _> = deserialize_list(&path, "items");
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        cleanup(&dir);
    }

    #[test]
    fn deserialize_file_parse_error_names_file() {
        let dir = make_test_dir("deser_parse_err");
        let path = dir.join("bad.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();

        let result: Result<Vec<ItemData>, _> = deserialize_file(&path);
        let err = result.unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { .. }));
        assert!(err.to_string().contains("bad.ron"));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // load_catalog
    // -----------------------------------------------------------------------

    #[test]
    fn load_catalog_from_ron() {
        let dir = make_test_dir("catalog_ron");
        write_glass_catalog(&dir);

        let catalog = load_catalog(&dir).unwrap();
        assert_eq!(catalog.item_count(), 3);
        assert_eq!(catalog.fuel_value(&ItemId::from("Coal")), Some(40.0));
        let furnace = catalog.device_for(&RecipeId::from("Melt Glass")).unwrap();
        assert!(furnace.requires_fuel);

        cleanup(&dir);
    }

    #[test]
    fn load_catalog_mixed_formats() {
        let dir = make_test_dir("catalog_mixed");
        fs::write(dir.join("items.ron"), ITEMS_RON).unwrap();
        fs::write(
            dir.join("devices.toml"),
            r#"
[[devices]]
name = "Furnace"
kind = "workshop"
throughput = 12.0
heat = 30.0
"#,
        )
        .unwrap();
        fs::write(
            dir.join("recipes.json"),
            r#"[{"name": "Melt Glass", "output": {"item": "Glass", "quantity": 1},
                 "inputs": [["Sand", 2]], "device": "Furnace", "duration": 5}]"#,
        )
        .unwrap();

        let catalog = load_catalog(&dir).unwrap();
        let recipe = catalog.recipe_for(&ItemId::from("Glass")).unwrap();
        assert_eq!(recipe.duration, Some(5.0));
        assert_eq!(recipe.inputs[0].quantity, 2.0);

        cleanup(&dir);
    }

    #[test]
    fn load_catalog_unresolved_item_names_recipe_file() {
        let dir = make_test_dir("catalog_unresolved");
        write_glass_catalog(&dir);
        fs::write(
            dir.join("recipes.ron"),
            r#"[(name: "Melt Glass", output: ("Glass", 1.0), inputs: [("Quartz", 2.0)], device: "Furnace")]"#,
        )
        .unwrap();

        match load_catalog(&dir) {
            Err(DataLoadError::UnresolvedRef {
                file,
                name,
                expected_kind,
            }) => {
                assert_eq!(name, "Quartz");
                assert_eq!(expected_kind, "item");
                assert!(file.ends_with("recipes.ron"));
            }
            other => panic!("expected UnresolvedRef, got: {other:?}"),
        }

        cleanup(&dir);
    }

    #[test]
    fn load_catalog_duplicate_item() {
        let dir = make_test_dir("catalog_dup");
        write_glass_catalog(&dir);
        fs::write(dir.join("items.ron"), r#"[(name: "Sand"), (name: "Glass"), (name: "Sand")]"#)
            .unwrap();

        assert!(matches!(
            load_catalog(&dir),
            Err(DataLoadError::DuplicateName { ref name, .. }) if name == "Sand"
        ));

        cleanup(&dir);
    }

    #[test]
    fn load_catalog_wraps_catalog_errors() {
        let dir = make_test_dir("catalog_invalid");
        write_glass_catalog(&dir);
        fs::write(dir.join("devices.ron"), r#"[(name: "Furnace", throughput: 0.0)]"#).unwrap();

        let err = load_catalog(&dir).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::Catalog(CatalogError::InvalidQuantity { field: "throughput", .. })
        ));
        assert!(err.to_string().starts_with("invalid catalog"));

        cleanup(&dir);
    }

    #[test]
    fn load_catalog_missing_recipes_file() {
        let dir = make_test_dir("catalog_missing");
        fs::write(dir.join("items.ron"), ITEMS_RON).unwrap();
        fs::write(dir.join("devices.ron"), DEVICES_RON).unwrap();

        assert!(matches!(
            load_catalog(&dir),
            Err(DataLoadError::MissingRequired { ref file, .. }) if file == "recipes"
        ));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Bundled data
    // -----------------------------------------------------------------------

    #[test]
    fn bundled_catalog_loads() {
        let catalog = load_catalog(&bundled_data_dir()).unwrap();
        assert!(catalog.contains_item(&ItemId::from("Healing Potion")));
        assert_eq!(catalog.fuels().count(), 2);
        assert_eq!(catalog.fertilizers().count(), 1);
    }

    #[test]
    fn bundled_plans_load() {
        let plan = load_plan(&bundled_data_dir().join("healing_potion.ron")).unwrap();
        assert_eq!(plan.targets.len(), 1);
        assert_eq!(plan.targets[0].item, ItemId::from("Healing Potion"));
        assert_eq!(plan.configuration.levels.logistics, 1);

        let plan = load_plan(&bundled_data_dir().join("potion_shop.json")).unwrap();
        assert_eq!(plan.targets.len(), 2);
    }

    #[test]
    fn error_display_messages() {
        let e = DataLoadError::MissingRequired {
            file: "items".to_string(),
            dir: PathBuf::from("/data"),
        };
        assert!(e.to_string().contains("items"));
        assert!(e.to_string().contains("/data"));

        let e = DataLoadError::UnresolvedRef {
            file: PathBuf::from("recipes.ron"),
            name: "Furnace".to_string(),
            expected_kind: "device",
        };
        let msg = e.to_string();
        assert!(msg.contains("Furnace"));
        assert!(msg.contains("device"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let data_err: DataLoadError = io_err.into();
        assert!(matches!(data_err, DataLoadError::Io(_)));
        assert!(data_err.to_string().contains("file not found"));
    }
}
